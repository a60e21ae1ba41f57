use logmine::tokenize::{
    deduplicate_placeholders, tokenize_pattern, tokenizer_by_name, AdaptiveTokenizer,
    LogfmtTokenizer, Tokenizer,
};

fn toks(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

#[test]
fn adaptive_splits_and_joins_on_single_spaces() {
    let tokenizer = AdaptiveTokenizer;
    let tokens = tokenizer.marshal("user 42 logged in");
    assert_eq!(tokens, toks(&["user", "42", "logged", "in"]));
    assert_eq!(tokenizer.unmarshal(&tokens), "user 42 logged in");
}

#[test]
fn dedup_collapses_adjacent_placeholder_runs() {
    let out = deduplicate_placeholders(&toks(&["foo", "<_>", "<_>", "<_>", "bar"]), "<_>");
    assert_eq!(out, toks(&["foo", "<_>", "bar"]));
}

#[test]
fn dedup_keeps_isolated_placeholders() {
    let tokens = toks(&["<_>", "a", "<_>", "b", "<_>"]);
    assert_eq!(deduplicate_placeholders(&tokens, "<_>"), tokens);
}

#[test]
fn dedup_keeps_repeated_literals() {
    let tokens = toks(&["go", "go", "go"]);
    assert_eq!(deduplicate_placeholders(&tokens, "<_>"), tokens);
}

#[test]
fn dedup_is_idempotent() {
    let cases = [
        toks(&["<_>", "<_>"]),
        toks(&["a", "<_>", "<_>", "b"]),
        toks(&["<_>"]),
        toks(&["a", "b", "c"]),
    ];
    for tokens in cases {
        let once = deduplicate_placeholders(&tokens, "<_>");
        let twice = deduplicate_placeholders(&once, "<_>");
        assert_eq!(once, twice);
    }
}

#[test]
fn tokenize_pattern_splits_then_dedups() {
    let out = tokenize_pattern("foo <_> <_> bar <_>", "<_>");
    assert_eq!(out, toks(&["foo", "<_>", "bar", "<_>"]));
}

#[test]
fn logfmt_marks_keys_for_exact_matching() {
    let tokenizer = LogfmtTokenizer {
        tokenize_inside_quotes: true,
    };
    let tokens = tokenizer.marshal("level=info msg=started");
    assert_eq!(tokens, toks(&["\0level=", "info", "\0msg=", "started"]));
}

#[test]
fn logfmt_tokenizes_inside_quoted_values() {
    let tokenizer = LogfmtTokenizer {
        tokenize_inside_quotes: true,
    };
    let tokens = tokenizer.marshal(r#"msg="user logged in" level=info"#);
    assert_eq!(
        tokens,
        toks(&["\0msg=", "user", "logged", "in", "\0level=", "info"])
    );
}

#[test]
fn logfmt_keeps_quoted_values_whole_when_configured() {
    let tokenizer = LogfmtTokenizer {
        tokenize_inside_quotes: false,
    };
    let tokens = tokenizer.marshal(r#"msg="user logged in""#);
    assert_eq!(tokens, toks(&["\0msg=", "user logged in"]));
}

#[test]
fn logfmt_unmarshal_reattaches_values_to_keys() {
    let tokenizer = LogfmtTokenizer {
        tokenize_inside_quotes: true,
    };
    let tokens = toks(&["\0level=", "info", "\0msg=", "started", "up"]);
    assert_eq!(tokenizer.unmarshal(&tokens), "level=info msg=started up");
}

#[test]
fn logfmt_passes_plain_words_through() {
    let tokenizer = LogfmtTokenizer {
        tokenize_inside_quotes: true,
    };
    assert_eq!(
        tokenizer.marshal("starting worker pool"),
        toks(&["starting", "worker", "pool"])
    );
}

#[test]
fn tokenizer_selection_by_name() {
    let logfmt = tokenizer_by_name("logfmt");
    assert_eq!(logfmt.marshal("a=1")[0], "\0a=");

    let default = tokenizer_by_name("");
    assert_eq!(default.marshal("a=1")[0], "a=1");
}
