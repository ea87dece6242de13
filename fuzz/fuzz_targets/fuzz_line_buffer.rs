//! Fuzz target: `LineBuffer`
//!
//! Feeds arbitrary bytes in arbitrary chunk sizes (the first byte picks
//! the chunk length) and checks that every yielded line respects the
//! configured limit and carries no terminator.
//!
//! cargo fuzz run fuzz_line_buffer

#![no_main]

use libfuzzer_sys::fuzz_target;
use zucchini::protocol::line::LineBuffer;

const MAX_LEN: usize = 256;

fuzz_target!(|data: &[u8]| {
    let Some((&chunk, data)) = data.split_first() else {
        return;
    };
    let chunk = usize::from(chunk).max(1);
    let mut buf = LineBuffer::new(MAX_LEN);

    for piece in data.chunks(chunk) {
        let mut rest = piece;
        while !rest.is_empty() {
            let taken = buf.feed(rest);
            rest = &rest[taken..];
            while let Some(line) = buf.next_line() {
                if let Ok(line) = line {
                    assert!(line.len() <= MAX_LEN, "line exceeds limit");
                    assert!(!line.contains('\n'), "terminator leaked into line");
                }
            }
        }
    }

    buf.reset();
    assert!(buf.next_line().is_none());
});
