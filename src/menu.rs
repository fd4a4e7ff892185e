/// What the dashboard should do with the first line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuChoice {
    ClassReport,
    StudentLookup,
    Invalid(String),
}

pub fn parse_choice(input: &str) -> MenuChoice {
    match input.trim() {
        "1" => MenuChoice::ClassReport,
        "2" => MenuChoice::StudentLookup,
        other => MenuChoice::Invalid(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_choices() {
        assert_eq!(parse_choice("1"), MenuChoice::ClassReport);
        assert_eq!(parse_choice(" 2\n"), MenuChoice::StudentLookup);
    }

    #[test]
    fn everything_else_is_invalid() {
        for input in ["3", "", "  ", "12", "one", "1.0", "2 2"] {
            assert!(
                matches!(parse_choice(input), MenuChoice::Invalid(_)),
                "{input:?} should be invalid"
            );
        }
    }
}
