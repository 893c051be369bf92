//! Integration tests for the markup tokenizer.

use gleaner_markup::dom::RawKind;
use gleaner_markup::{Encoding, ParseOptions, Token, Tokenizer};

/// Helper to tokenize a string and return the tokens, end-of-stream included
fn tokenize_with(input: &str, options: &ParseOptions) -> Vec<Token> {
    let mut tokenizer = Tokenizer::from_bytes(input.as_bytes(), options).unwrap();
    tokenizer.run().unwrap();
    tokenizer.into_tokens()
}

fn tokenize(input: &str) -> Vec<Token> {
    tokenize_with(input, &ParseOptions::html())
}

fn text(s: &str) -> Token {
    Token::Text {
        text: s.to_string(),
    }
}

#[test]
fn test_anchor_round() {
    let tokens = tokenize(r#"<a href="x">hi</a>"#);
    assert_eq!(tokens.len(), 4); // start, text, end + EOS
    match &tokens[0] {
        Token::StartTag {
            name,
            attributes,
            self_closing,
        } => {
            assert_eq!(name, "a");
            assert_eq!(attributes.get("href"), Some("x"));
            assert_eq!(attributes.len(), 1);
            assert!(!self_closing);
        }
        _ => panic!("Expected StartTag token"),
    }
    assert_eq!(tokens[1], text("hi"));
    assert!(matches!(&tokens[2], Token::EndTag { name } if name == "a"));
    assert!(tokens[3].is_end_of_stream());
}

#[test]
fn test_text_is_hypertrimmed() {
    let tokens = tokenize("<p>\n   lots   of \t space \n</p>");
    assert_eq!(tokens[1], text("lots of space"));
}

#[test]
fn test_whitespace_only_text_dropped_unless_kept() {
    let tokens = tokenize("<p> </p>");
    assert_eq!(tokens.len(), 3);
    let kept = tokenize_with("<p> </p>", &ParseOptions::html().with_empty_text());
    assert_eq!(kept[1], text(""));
}

#[test]
fn test_names_lowercased_in_html_only() {
    let tokens = tokenize("<DIV Class=x></DIV>");
    assert!(matches!(&tokens[0], Token::StartTag { name, attributes, .. }
        if name == "div" && attributes.get("class") == Some("x")));
    assert!(matches!(&tokens[1], Token::EndTag { name } if name == "div"));

    let tokens = tokenize_with("<Item Key='v'/>", &ParseOptions::xml());
    assert!(matches!(&tokens[0], Token::StartTag { name, attributes, self_closing: true }
        if name == "Item" && attributes.get("Key") == Some("v")));
}

#[test]
fn test_void_elements_self_close() {
    let tokens = tokenize("<br><img src=a.png><hr/>");
    for token in &tokens[..3] {
        assert!(matches!(token, Token::StartTag { self_closing: true, .. }));
    }
}

#[test]
fn test_literal_less_than() {
    let tokens = tokenize("a < b and 3<4 <");
    assert_eq!(tokens, vec![text("a < b and 3<4 <"), Token::EndOfStream]);
}

#[test]
fn test_end_tag_first_word() {
    let tokens = tokenize("</ div  junk >");
    assert!(matches!(&tokens[0], Token::EndTag { name } if name == "div"));
}

#[test]
fn test_empty_end_tag_ignored() {
    assert_eq!(tokenize("</>x"), vec![text("x"), Token::EndOfStream]);
}

#[test]
fn test_quoted_gt_inside_attribute() {
    let tokens = tokenize(r#"<a title="1 > 0" href='b'>"#);
    match &tokens[0] {
        Token::StartTag { attributes, .. } => {
            assert_eq!(attributes.get("title"), Some("1 > 0"));
            assert_eq!(attributes.get("href"), Some("b"));
        }
        _ => panic!("Expected StartTag token"),
    }
}

#[test]
fn test_escaped_quote_in_html_mode() {
    let tokens = tokenize(r#"<a title="say \"hi\"">x</a>"#);
    match &tokens[0] {
        Token::StartTag { attributes, .. } => {
            assert_eq!(attributes.get("title"), Some(r#"say \"hi\""#));
        }
        _ => panic!("Expected StartTag token"),
    }
    assert_eq!(tokens[1], text("x"));
}

#[test]
fn test_script_captured_raw() {
    let tokens = tokenize("<script>var x = '<div>';</script>");
    assert_eq!(
        tokens,
        vec![
            Token::RawBlock {
                kind: RawKind::Script,
                text: "var x = '<div>';".to_string(),
            },
            Token::EndOfStream,
        ]
    );
}

#[test]
fn test_style_end_marker_case_and_space() {
    let tokens = tokenize("<STYLE type=text/css>a > b {}</Style >after");
    assert_eq!(
        tokens[0],
        Token::RawBlock {
            kind: RawKind::Style,
            text: "a > b {}".to_string(),
        }
    );
    assert_eq!(tokens[1], text("after"));
}

#[test]
fn test_scripts_prefix_is_not_raw() {
    let tokens = tokenize("<scripts>x</scripts>");
    assert!(matches!(&tokens[0], Token::StartTag { name, .. } if name == "scripts"));
}

#[test]
fn test_self_closed_script_is_plain_tag() {
    let tokens = tokenize("<script src=a.js />x");
    assert!(matches!(&tokens[0], Token::StartTag { name, self_closing: true, .. } if name == "script"));
    assert_eq!(tokens[1], text("x"));
}

#[test]
fn test_no_raw_capture_in_xml() {
    let tokens = tokenize_with("<script>a<b/></script>", &ParseOptions::xml());
    assert!(matches!(&tokens[0], Token::StartTag { name, .. } if name == "script"));
    assert!(matches!(&tokens[2], Token::StartTag { name, self_closing: true, .. } if name == "b"));
}

#[test]
fn test_unterminated_script_still_emitted() {
    let tokens = tokenize("<script>if (a < b) { go(); }");
    assert_eq!(
        tokens,
        vec![
            Token::RawBlock {
                kind: RawKind::Script,
                text: "if (a < b) { go(); }".to_string(),
            },
            Token::EndOfStream,
        ]
    );
}

#[test]
fn test_comment() {
    let tokens = tokenize("<!-- hello -->");
    assert!(matches!(&tokens[0], Token::Comment { text } if text == " hello "));
}

#[test]
fn test_ignore_comments() {
    let tokens = tokenize_with("<!-- x --><p>", &ParseOptions::html().with_ignored_comments());
    assert!(matches!(&tokens[0], Token::StartTag { name, .. } if name == "p"));
}

#[test]
fn test_conditional_comment_nesting() {
    let tokens = tokenize("<!--[if IE]><![endif]-->after");
    assert!(matches!(&tokens[0], Token::Comment { text } if text == "[if IE]><![endif]"));
    assert_eq!(tokens[1], text("after"));
}

#[test]
fn test_conditional_comment_keeps_following_markup() {
    let tokens = tokenize("<!--[if lt IE 9]><script src=x></script><![endif]--><p>Main</p>");
    let expected = "[if lt IE 9]><script src=x></script><![endif]";
    assert!(matches!(&tokens[0], Token::Comment { text } if text == expected));
    assert!(matches!(&tokens[1], Token::StartTag { name, .. } if name == "p"));
    assert_eq!(tokens[2], text("Main"));
    assert!(matches!(&tokens[3], Token::EndTag { name } if name == "p"));
}

#[test]
fn test_unterminated_comment_ends_stream() {
    let tokens = tokenize("before<!-- never closed <p>x</p>");
    assert_eq!(tokens, vec![text("before"), Token::EndOfStream]);
}

#[test]
fn test_declarations_dropped_or_retained() {
    let input = "<!DOCTYPE html><?xml version=\"1.0\"?><p>";
    let dropped = tokenize(input);
    assert!(matches!(&dropped[0], Token::StartTag { .. }));

    let retained = tokenize_with(input, &ParseOptions::html().with_retained_comments());
    assert!(matches!(&retained[0], Token::Comment { text } if text == "!DOCTYPE html"));
    assert!(matches!(&retained[1], Token::Comment { text } if text == "?xml version=\"1.0\"?"));
}

#[test]
fn test_escaped_gt_in_declaration() {
    let tokens = tokenize_with(
        r"<!ENTITY a \> b>x",
        &ParseOptions::html().with_retained_comments(),
    );
    assert!(matches!(&tokens[0], Token::Comment { text } if text == r"!ENTITY a \> b"));
    assert_eq!(tokens[1], text("x"));
}

#[test]
fn test_cdata_becomes_text() {
    let tokens = tokenize_with("<t><![CDATA[ a <b> ]]></t>", &ParseOptions::xml());
    assert_eq!(tokens[1], text("a <b>"));
}

#[test]
fn test_first_duplicate_attribute_wins() {
    let tokens = tokenize("<a href=1 HREF=2>");
    match &tokens[0] {
        Token::StartTag { attributes, .. } => {
            assert_eq!(attributes.get("href"), Some("1"));
            assert_eq!(attributes.len(), 1);
        }
        _ => panic!("Expected StartTag token"),
    }
}

#[test]
fn test_end_of_stream_repeats() {
    let mut tokenizer = Tokenizer::from_bytes(b"x", &ParseOptions::html()).unwrap();
    assert_eq!(tokenizer.next_token().unwrap(), text("x"));
    assert!(tokenizer.next_token().unwrap().is_end_of_stream());
    assert!(tokenizer.next_token().unwrap().is_end_of_stream());
}

#[test]
fn test_iterator_stops_before_end_of_stream() {
    let tokenizer = Tokenizer::from_bytes(b"<b>x</b>", &ParseOptions::html()).unwrap();
    let tokens: Vec<Token> = tokenizer.map(Result::unwrap).collect();
    assert_eq!(tokens.len(), 3);
}

#[test]
fn test_forced_encoding() {
    let options = ParseOptions::html().with_encoding(Encoding::Windows1252);
    let tokens = tokenize_with("<p>\u{80}</p>", &options);
    // U+0080 is C2 80 in UTF-8; as windows-1252 that is Â€
    assert_eq!(tokens[1], text("Â€"));
}

#[test]
fn test_display() {
    let tokens = tokenize(r#"<a href="x">"#);
    assert_eq!(tokens[0].to_string(), r#"StartTag <a href="x">"#);
    assert_eq!(Token::EndOfStream.to_string(), "EndOfStream");
}
