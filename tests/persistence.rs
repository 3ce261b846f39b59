use bucketry::{BucketList, ChainingTable, Error, OpenTable, Persist, Queue, Stack};
use test_log::test;

#[test]
fn chaining_table_text_file_round_trip() -> bucketry::Result<()> {
    let folder = tempfile::tempdir()?;
    let path = folder.path().join("chaining.txt");

    let mut table = ChainingTable::new();
    for i in 0..200 {
        table.insert(i.to_string());
    }
    table.insert("with spaces  ");
    table.save_text(&path)?;

    let mut loaded = ChainingTable::new();
    loaded.insert("stale");
    loaded.load_text(&path)?;

    assert_eq!(loaded.len(), 201);
    assert!(!loaded.contains("stale"));
    assert!(loaded.contains("with spaces  "));
    assert_eq!(loaded.iter().collect::<Vec<_>>(), table.iter().collect::<Vec<_>>());

    Ok(())
}

#[test]
fn chaining_table_binary_file_round_trip() -> bucketry::Result<()> {
    let folder = tempfile::tempdir()?;
    let path = folder.path().join("chaining.bin");

    let table: ChainingTable = ["alpha", "beta", "alpha", ""].into_iter().collect();
    table.save_binary(&path)?;

    let mut loaded = ChainingTable::new();
    loaded.load_binary(&path)?;

    assert_eq!(loaded.len(), 4);
    assert_eq!(loaded.iter().collect::<Vec<_>>(), table.iter().collect::<Vec<_>>());

    Ok(())
}

#[test]
fn open_table_text_file_round_trip() -> bucketry::Result<()> {
    let folder = tempfile::tempdir()?;
    let path = folder.path().join("open.txt");

    let mut table = OpenTable::new();
    table.insert("apple", "red")?;
    table.insert("banana", "yellow")?;
    table.insert("cherry", " dark red ")?;
    table.remove("banana");
    table.save_text(&path)?;

    assert_eq!(std::fs::read_to_string(&path)?.lines().next(), Some("2"));

    let mut loaded = OpenTable::new();
    loaded.load_text(&path)?;

    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded.get("apple"), Some("red"));
    assert_eq!(loaded.get("banana"), None);
    assert_eq!(loaded.get("cherry"), Some(" dark red "));

    Ok(())
}

#[test]
fn open_table_binary_file_round_trip() -> bucketry::Result<()> {
    let folder = tempfile::tempdir()?;
    let path = folder.path().join("open.bin");

    let mut table = OpenTable::new();
    table.insert("x", "1")?;
    table.insert("y", "2")?;
    table.insert("z", "3")?;
    table.save_binary(&path)?;

    let mut loaded = OpenTable::new();
    loaded.load_binary(&path)?;

    assert_eq!(loaded.get("x"), Some("1"));
    assert_eq!(loaded.get("y"), Some("2"));
    assert_eq!(loaded.get("z"), Some("3"));
    assert_eq!(loaded.keys().collect::<Vec<_>>(), table.keys().collect::<Vec<_>>());

    Ok(())
}

#[test]
fn open_table_binary_layout() -> bucketry::Result<()> {
    let mut table = OpenTable::new();
    table.insert("k", "vv")?;

    let mut buffer = Vec::new();
    table.encode_binary(&mut buffer)?;

    let mut expected = Vec::new();
    expected.extend_from_slice(&1i32.to_le_bytes());
    expected.extend_from_slice(&1i32.to_le_bytes());
    expected.extend_from_slice(b"k");
    expected.extend_from_slice(&2i32.to_le_bytes());
    expected.extend_from_slice(b"vv");
    assert_eq!(buffer, expected);

    Ok(())
}

#[test]
fn stack_and_queue_files_keep_order() -> bucketry::Result<()> {
    let folder = tempfile::tempdir()?;

    let mut stack = Stack::new();
    let mut queue = Queue::new();
    for i in 0..10 {
        stack.push(i.to_string());
        queue.enqueue(i.to_string());
    }
    let stack_before = stack.clone();
    let queue_before = queue.clone();

    stack.save_text(folder.path().join("stack.txt"))?;
    stack.save_binary(folder.path().join("stack.bin"))?;
    queue.save_text(folder.path().join("queue.txt"))?;
    queue.save_binary(folder.path().join("queue.bin"))?;

    assert_eq!(stack, stack_before);
    assert_eq!(queue, queue_before);

    for file in ["stack.txt", "stack.bin"] {
        let mut loaded = Stack::new();
        if file.ends_with(".txt") {
            loaded.load_text(folder.path().join(file))?;
        } else {
            loaded.load_binary(folder.path().join(file))?;
        }
        assert_eq!(loaded, stack_before);
    }

    for file in ["queue.txt", "queue.bin"] {
        let mut loaded = Queue::new();
        if file.ends_with(".txt") {
            loaded.load_text(folder.path().join(file))?;
        } else {
            loaded.load_binary(folder.path().join(file))?;
        }
        assert_eq!(loaded, queue_before);
    }

    Ok(())
}

#[test]
fn bucket_list_file_round_trip() -> bucketry::Result<()> {
    let folder = tempfile::tempdir()?;
    let path = folder.path().join("list.bin");

    let list: BucketList = ["one", "two", "three"].into_iter().collect();
    list.save_binary(&path)?;

    let mut loaded = BucketList::new();
    loaded.load_binary(&path)?;
    assert_eq!(loaded.iter().collect::<Vec<_>>(), vec!["one", "two", "three"]);

    Ok(())
}

#[test]
fn missing_file_is_unavailable_and_target_untouched() -> bucketry::Result<()> {
    let folder = tempfile::tempdir()?;
    let path = folder.path().join("does-not-exist.bin");

    let mut table = OpenTable::new();
    table.insert("kept", "value")?;

    let result = table.load_binary(&path);
    assert!(matches!(result, Err(Error::Unavailable { .. })));
    assert_eq!(table.get("kept"), Some("value"));

    let result = table.save_text(folder.path().join("missing-dir").join("out.txt"));
    assert!(matches!(result, Err(Error::Unavailable { .. })));

    Ok(())
}

#[test]
fn malformed_binary_is_rejected() -> bucketry::Result<()> {
    let folder = tempfile::tempdir()?;
    let path = folder.path().join("bad.bin");

    // Count of one, key length far beyond the file size
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&1i32.to_le_bytes());
    bytes.extend_from_slice(&1_000_000i32.to_le_bytes());
    bytes.extend_from_slice(b"abc");
    std::fs::write(&path, &bytes)?;

    let mut table: ChainingTable = ["kept"].into_iter().collect();
    let result = table.load_binary(&path);
    assert!(matches!(result, Err(Error::Malformed(_))));
    assert!(table.contains("kept"));

    // Negative count
    std::fs::write(&path, (-3i32).to_le_bytes())?;
    let result = table.load_binary(&path);
    assert!(matches!(result, Err(Error::Malformed(_))));

    Ok(())
}

#[test]
fn truncated_text_is_rejected() -> bucketry::Result<()> {
    let folder = tempfile::tempdir()?;
    let path = folder.path().join("short.txt");
    std::fs::write(&path, "2\nkey\n")?;

    let mut table = OpenTable::new();
    let result = table.load_text(&path);
    assert!(matches!(result, Err(Error::Malformed(_))));
    assert!(table.is_empty());

    Ok(())
}

#[test]
fn element_count_matches_saved_count() -> bucketry::Result<()> {
    let folder = tempfile::tempdir()?;
    let path = folder.path().join("count.txt");

    let mut table = OpenTable::new();
    table.insert("a", "1")?;
    table.insert("b", "2")?;
    table.insert("c", "3")?;
    table.remove("b");
    table.save_text(&path)?;

    let saved = std::fs::read_to_string(&path)?;
    assert_eq!(saved.lines().next(), Some("2"));
    assert_eq!(table.element_count(), 2);

    let duplicates: ChainingTable = ["x", "x", "y"].into_iter().collect();
    assert_eq!(duplicates.element_count(), 3);

    Ok(())
}

#[test]
fn newline_in_text_field_is_rejected() -> bucketry::Result<()> {
    let folder = tempfile::tempdir()?;
    let path = folder.path().join("newline.txt");

    let mut table = OpenTable::new();
    table.insert("key", "first line\nsecond line")?;

    let result = table.save_text(&path);
    assert!(matches!(result, Err(Error::Malformed(_))));

    // The binary format has no such restriction
    table.save_binary(folder.path().join("newline.bin"))?;
    let mut loaded = OpenTable::new();
    loaded.load_binary(folder.path().join("newline.bin"))?;
    assert_eq!(loaded.get("key"), Some("first line\nsecond line"));

    Ok(())
}

#[test]
fn invalid_utf8_text_is_rejected() -> bucketry::Result<()> {
    let folder = tempfile::tempdir()?;
    let path = folder.path().join("latin1.txt");
    std::fs::write(&path, b"1\ncaf\xe9\n")?;

    let mut table: ChainingTable = ["kept"].into_iter().collect();
    let result = table.load_text(&path);
    assert!(matches!(result, Err(Error::Utf8(_))));
    assert!(table.contains("kept"));

    Ok(())
}
