#![no_main]

use libfuzzer_sys::fuzz_target;
use skelgen::lexer::{Lexer, Tok};

fuzz_target!(|data: &[u8]| {
    // Lossy decode so invalid UTF-8 still exercises the scanner.
    let s = String::from_utf8_lossy(data);

    let mut lx = Lexer::new(&s);

    let mut last_end = 0usize;
    let mut steps = 0usize;
    let max_steps = s.len() + 1;

    for (start, tok, end) in lx.by_ref() {
        assert!(start < end, "empty token {tok:?}");
        assert!(end <= s.len());
        assert!(start >= last_end);
        assert_ne!(tok, Tok::Eof);
        last_end = end;

        steps += 1;
        assert!(steps <= max_steps);
    }

    // Exhausted lexers keep answering Eof at end of input.
    assert_eq!(lx.next_token(), (s.len(), Tok::Eof, s.len()));
    assert_eq!(lx.next_token(), (s.len(), Tok::Eof, s.len()));
});
