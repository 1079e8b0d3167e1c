//! Line commands understood by the terminal host

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Replace the code field with this text
    Input(String),
    Resend,
    /// Back to login
    Back,
    Status,
    Quit,
}

impl Command {
    /// Parse a line; anything that is not a keyword is code input
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed.to_lowercase().as_str() {
            "resend" | "r" => Command::Resend,
            "back" | "b" => Command::Back,
            "status" | "s" | "" => Command::Status,
            "quit" | "q" | "exit" => Command::Quit,
            _ => Command::Input(trimmed.to_string()),
        }
    }
}

pub const HELP: &str = "Type the code (digits), or: resend, back, status, quit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords() {
        assert_eq!(Command::parse("resend\n"), Command::Resend);
        assert_eq!(Command::parse(" BACK "), Command::Back);
        assert_eq!(Command::parse(""), Command::Status);
        assert_eq!(Command::parse("q"), Command::Quit);
    }

    #[test]
    fn test_everything_else_is_input() {
        assert_eq!(Command::parse("123 456"), Command::Input("123 456".to_string()));
        assert_eq!(Command::parse("12"), Command::Input("12".to_string()));
    }
}
