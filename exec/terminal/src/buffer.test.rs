use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_offsets_keep_counting_after_eviction() {
    let mut buffer = OutputBuffer::new(2);
    buffer.push(b"a".to_vec());
    buffer.push(b"b".to_vec());
    buffer.push(b"c".to_vec());

    assert_eq!(buffer.len(), 2);
    assert_eq!(buffer.end_offset(), 3);
    assert_eq!(buffer.text_since(0), "bc");
    assert_eq!(buffer.text_since(2), "c");
    assert_eq!(buffer.text_since(3), "");
}

#[test]
fn test_empty_chunks_ignored() {
    let mut buffer = OutputBuffer::new(4);
    buffer.push(Vec::new());
    assert_eq!(buffer.end_offset(), 0);
}

#[test]
fn test_multibyte_split_across_chunks() {
    let mut buffer = OutputBuffer::new(4);
    let bytes = "é".as_bytes();
    buffer.push(bytes[..1].to_vec());
    buffer.push(bytes[1..].to_vec());
    assert_eq!(buffer.text_since(0), "é");
}

#[test]
fn test_zero_capacity_keeps_one_chunk() {
    let mut buffer = OutputBuffer::new(0);
    buffer.push(b"x".to_vec());
    buffer.push(b"y".to_vec());
    assert_eq!(buffer.text_since(0), "y");
}
