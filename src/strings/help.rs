//! # Help Text
//!
//! Displayed to the user via the `help` command.

pub fn main(prefix: &str) -> String {
    format!(
        concat!(
            "**Commands**\n",
            "* `{p}help`: Show this message\n",
            "* `{p}ping`: Check that I'm awake\n",
            "* `{p}about`: Who I am and what I can do",
        ),
        p = prefix
    )
}
