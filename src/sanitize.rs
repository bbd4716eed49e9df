use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref EMPHASIS: Regex = Regex::new(r"[*`]").unwrap();
    static ref HEADING: Regex = Regex::new(r"(?m)^(?:#{1,6}[ \t]*)+").unwrap();
    static ref BLANK_RUN: Regex = Regex::new(r"\n{3,}").unwrap();
}

// Strip markdown from generated text; clean(clean(x)) == clean(x)
pub fn clean(text: &str) -> String {
    let mut current = pass(text);
    // one pass can expose a new heading (e.g. "*# x" or a leading "  # x"),
    // so repeat until nothing changes; every pass only removes characters
    loop {
        let next = pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn pass(text: &str) -> String {
    let text = EMPHASIS.replace_all(text, "");
    let text = HEADING.replace_all(&text, "");
    let text = BLANK_RUN.replace_all(&text, "\n\n");
    text.trim().to_string()
}
