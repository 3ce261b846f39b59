//! Text and binary persistence shared by every container
//!
//! Text layout: the first line holds the decimal element count, followed by one line per
//! field. Binary layout: a 32-bit signed count followed by one 32-bit length prefix plus raw
//! bytes per field.

use crate::{Error, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, ErrorKind, Read, Write},
    path::Path,
};

/// Persistence in the text and binary formats
///
/// Decoding replaces the whole content of `self`. Implementations stage the decoded elements
/// in a fresh container and only swap it in once the stream was read completely, so a failed
/// decode leaves `self` untouched.
pub trait Persist {
    /// Number of elements written as the count of both formats
    fn element_count(&self) -> usize;

    /// Writes the text representation
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails or a field contains a newline.
    fn encode_text<W: Write>(&self, writer: &mut W) -> Result<()>;

    /// Replaces the content of `self` with the decoded text representation
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or the stream is malformed.
    fn decode_text<R: BufRead>(&mut self, reader: &mut R) -> Result<()>;

    /// Writes the binary representation
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails or a field is too large for its length prefix.
    fn encode_binary<W: Write>(&self, writer: &mut W) -> Result<()>;

    /// Replaces the content of `self` with the decoded binary representation
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or the stream is malformed.
    fn decode_binary<R: Read>(&mut self, reader: &mut R) -> Result<()>;

    /// Saves the text representation to `path`, creating or truncating the file
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unavailable`] if the file cannot be created.
    fn save_text<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(create(path)?);
        self.encode_text(&mut writer)?;
        writer.flush()?;

        log::debug!("Saved {} elements as text to {}", self.element_count(), path.display());
        Ok(())
    }

    /// Loads the text representation from `path`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unavailable`] if the file cannot be opened; `self` is untouched then.
    fn load_text<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut reader = BufReader::new(open(path)?);
        self.decode_text(&mut reader)?;

        log::debug!("Loaded {} elements as text from {}", self.element_count(), path.display());
        Ok(())
    }

    /// Saves the binary representation to `path`, creating or truncating the file
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unavailable`] if the file cannot be created.
    fn save_binary<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(create(path)?);
        self.encode_binary(&mut writer)?;
        writer.flush()?;

        log::debug!("Saved {} elements as binary to {}", self.element_count(), path.display());
        Ok(())
    }

    /// Loads the binary representation from `path`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unavailable`] if the file cannot be opened; `self` is untouched then.
    fn load_binary<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut reader = BufReader::new(open(path)?);
        self.decode_binary(&mut reader)?;

        log::debug!("Loaded {} elements as binary from {}", self.element_count(), path.display());
        Ok(())
    }
}

/// Opens `path` for reading
fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| Error::Unavailable { path: path.to_path_buf(), source })
}

/// Creates or truncates `path` for writing
fn create(path: &Path) -> Result<File> {
    File::create(path).map_err(|source| Error::Unavailable { path: path.to_path_buf(), source })
}

/// Writes the count line of the text format
pub(crate) fn write_text_count<W: Write>(writer: &mut W, count: usize) -> Result<()> {
    writeln!(writer, "{count}")?;
    Ok(())
}

/// Writes one field line of the text format
///
/// Fields containing a newline are rejected since they could not be read back.
pub(crate) fn write_text_field<W: Write>(writer: &mut W, field: &str) -> Result<()> {
    if field.contains('\n') {
        return Err(Error::Malformed("text field contains a newline"));
    }
    writeln!(writer, "{field}")?;
    Ok(())
}

/// Reads the count line of the text format
///
/// Surrounding whitespace is ignored, negative or non-numeric counts are rejected.
pub(crate) fn read_text_count<R: BufRead>(reader: &mut R) -> Result<usize> {
    let mut line = Vec::new();
    if reader.read_until(b'\n', &mut line)? == 0 {
        return Err(Error::Malformed("missing count line"));
    }

    std::str::from_utf8(&line)
        .ok()
        .and_then(|line| line.trim().parse::<usize>().ok())
        .ok_or(Error::Malformed("invalid count line"))
}

/// Reads one field line of the text format
///
/// Only the trailing newline is stripped; a final line without newline is accepted.
pub(crate) fn read_text_field<R: BufRead>(reader: &mut R) -> Result<String> {
    let mut line = Vec::new();
    if reader.read_until(b'\n', &mut line)? == 0 {
        return Err(Error::Malformed("stream ended before all fields were read"));
    }

    if line.last() == Some(&b'\n') {
        line.pop();
    }
    Ok(String::from_utf8(line)?)
}

/// Converts a length to the 32-bit prefix used by the binary format
fn to_prefix(len: usize) -> Result<i32> {
    i32::try_from(len).map_err(|_| Error::FieldTooLarge(len))
}

/// Writes the element count of the binary format
pub(crate) fn write_binary_count<W: Write>(writer: &mut W, count: usize) -> Result<()> {
    writer.write_i32::<LittleEndian>(to_prefix(count)?)?;
    Ok(())
}

/// Writes one length-prefixed field of the binary format
pub(crate) fn write_binary_field<W: Write>(writer: &mut W, field: &str) -> Result<()> {
    writer.write_i32::<LittleEndian>(to_prefix(field.len())?)?;
    writer.write_all(field.as_bytes())?;
    Ok(())
}

/// Reads a 32-bit prefix, reporting a stream that ends inside it as malformed
fn read_prefix<R: Read>(reader: &mut R) -> Result<i32> {
    reader.read_i32::<LittleEndian>().map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => Error::Malformed("stream ended inside a length prefix"),
        _ => Error::Io(e),
    })
}

/// Reads the element count of the binary format
pub(crate) fn read_binary_count<R: Read>(reader: &mut R) -> Result<usize> {
    let count = read_prefix(reader)?;
    usize::try_from(count).map_err(|_| Error::Malformed("negative element count"))
}

/// Reads one length-prefixed field of the binary format
///
/// The length prefix is never trusted for allocation: at most the bytes actually present in
/// the stream are buffered, and a short read is reported as malformed.
pub(crate) fn read_binary_field<R: Read>(reader: &mut R) -> Result<String> {
    let len = read_prefix(reader)?;
    let len = u64::try_from(len).map_err(|_| Error::Malformed("negative field length"))?;

    let mut bytes = Vec::new();
    let read = reader.by_ref().take(len).read_to_end(&mut bytes)?;
    if u64::try_from(read).ok() != Some(len) {
        return Err(Error::Malformed("field length runs past the end of the stream"));
    }

    log::trace!("Decoded field of {len} bytes");
    Ok(String::from_utf8(bytes)?)
}
