use flagkit_derive::flagkit_error;
use std::borrow::Cow;

#[flagkit_error]
pub enum DemoError {
    #[error("Parse error{}: {source}", format_context(.context))]
    Parse {
        #[source]
        source: std::num::ParseIntError,
        context: Option<std::borrow::Cow<'static, str>>,
    },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn parse(raw: &str) -> Result<i32, DemoError> {
    raw.parse::<i32>().context("parsing demo value")
}

fn main() {
    let _ = parse("12");
}
