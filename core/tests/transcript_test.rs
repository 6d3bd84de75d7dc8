use liveflow::transcript::{RecognitionResult, TranscriptBuffer};

#[test]
fn test_segments_grow_only_on_final_results() {
    let mut buffer = TranscriptBuffer::new();
    let mut lengths = Vec::new();

    let events = [
        RecognitionResult::temporary("h", 0.2, 100),
        RecognitionResult::temporary("he", 0.3, 200),
        RecognitionResult::finalized("hello", 0.9, 300),
        RecognitionResult::temporary("w", 0.2, 400),
        RecognitionResult::finalized("world", 0.8, 500),
    ];

    for event in &events {
        buffer.apply(event);
        lengths.push(buffer.segments().len());
    }

    // Non-decreasing, strictly increasing only on finals
    assert_eq!(lengths, vec![0, 0, 1, 1, 2]);
}

#[test]
fn test_final_after_provisionals_adds_exactly_one_segment() {
    let mut buffer = TranscriptBuffer::new();

    buffer.apply(&RecognitionResult::temporary("hel", 0.4, 100));
    buffer.apply(&RecognitionResult::temporary("hello", 0.5, 200));
    let before = buffer.segments().len();

    buffer.apply(&RecognitionResult::finalized("hello", 0.9, 300));

    assert_eq!(buffer.current_text(), "");
    assert_eq!(buffer.segments().len(), before + 1);
}

#[test]
fn test_confidence_mean_independent_of_provisionals() {
    let mut with_provisionals = TranscriptBuffer::new();
    let mut finals_only = TranscriptBuffer::new();

    for (i, confidence) in [0.9f32, 0.7, 0.8].iter().enumerate() {
        let ts = i as u64 * 100;
        with_provisionals.apply(&RecognitionResult::temporary("draft", 0.1, ts));
        with_provisionals.apply(&RecognitionResult::finalized("text", *confidence, ts + 50));
        finals_only.apply(&RecognitionResult::finalized("text", *confidence, ts + 50));
    }

    assert_eq!(with_provisionals.confidence(), finals_only.confidence());
    assert!((with_provisionals.confidence() - 0.8).abs() < 1e-6);
}

#[test]
fn test_scenario_hello_world() {
    let mut buffer = TranscriptBuffer::new();

    buffer.apply(&RecognitionResult::temporary("hel", 0.3, 100));
    buffer.apply(&RecognitionResult::temporary("hello", 0.5, 200));
    buffer.apply(&RecognitionResult::finalized("hello", 0.9, 300));
    buffer.apply(&RecognitionResult::temporary("wor", 0.4, 400));
    buffer.apply(&RecognitionResult::finalized("world", 0.8, 500));

    let segments = buffer.segments();
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].text, "hello");
    assert_eq!(segments[0].confidence, 0.9);
    assert_eq!(segments[1].text, "world");
    assert_eq!(segments[1].confidence, 0.8);

    assert_eq!(buffer.current_text(), "");
    assert!((buffer.confidence() - 0.85).abs() < f32::EPSILON);
    assert_eq!(buffer.concatenated(), "hello world");
}

#[test]
fn test_segments_keep_arrival_order() {
    let mut buffer = TranscriptBuffer::new();

    // The buffer trusts engine ordering: no reordering by timestamp
    buffer.apply(&RecognitionResult::finalized("second", 0.9, 2000));
    buffer.apply(&RecognitionResult::finalized("first", 0.9, 1000));

    let texts: Vec<&str> = buffer.segments().iter().map(|s| s.text.as_str()).collect();
    assert_eq!(texts, vec!["second", "first"]);
}

#[test]
fn test_segments_are_never_mutated_after_insertion() {
    let mut buffer = TranscriptBuffer::new();

    buffer.apply(&RecognitionResult::finalized("fixed", 0.9, 100));
    let recorded = buffer.segments()[0].clone();

    buffer.apply(&RecognitionResult::temporary("noise", 0.1, 200));
    buffer.apply(&RecognitionResult::finalized("more", 0.5, 300));

    assert_eq!(buffer.segments()[0], recorded);
}

#[test]
fn test_clear_then_continue() {
    let mut buffer = TranscriptBuffer::new();

    buffer.apply(&RecognitionResult::finalized("a", 0.9, 100));
    buffer.apply(&RecognitionResult::finalized("b", 0.7, 200));
    buffer.clear();

    assert!(buffer.segments().is_empty());
    assert_eq!(buffer.confidence(), 0.0);

    buffer.apply(&RecognitionResult::finalized("c", 0.6, 300));
    assert_eq!(buffer.segments().len(), 1);
    assert_eq!(buffer.confidence(), 0.6);
    // Ids stay monotonic across the clear
    assert_eq!(buffer.segments()[0].id, 2);
}

#[test]
fn test_diarized_results() {
    let mut buffer = TranscriptBuffer::new();

    buffer.apply(&RecognitionResult::finalized("hi there", 0.9, 100).with_speaker("speaker_0"));
    buffer.apply(&RecognitionResult::finalized("hello", 0.8, 200).with_speaker("speaker_1"));

    assert_eq!(buffer.segments()[0].speaker.as_deref(), Some("speaker_0"));
    assert_eq!(buffer.segments()[1].speaker.as_deref(), Some("speaker_1"));
}
