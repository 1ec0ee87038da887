use thiserror::Error;

pub const MAX_FILE_NAME_CHARS: usize = 255;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("name is empty")]
    Empty,
    #[error("name contains a control character")]
    ControlCharacter,
    #[error("name contains forbidden character {0:?}")]
    ForbiddenCharacter(char),
    #[error("name is {0} characters long (limit {max})", max = MAX_FILE_NAME_CHARS)]
    TooLong(usize),
}

/// Rejects a target file name that is unsafe to hand to the filesystem.
/// Nothing is rewritten; a bad name is an error for that file.
pub fn validate_file_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::Empty);
    }

    for ch in name.chars() {
        if ch.is_control() {
            return Err(ValidationError::ControlCharacter);
        }
        if is_forbidden_char(ch) {
            return Err(ValidationError::ForbiddenCharacter(ch));
        }
    }

    let len = name.chars().count();
    if len > MAX_FILE_NAME_CHARS {
        return Err(ValidationError::TooLong(len));
    }

    Ok(())
}

fn is_forbidden_char(ch: char) -> bool {
    matches!(ch, '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_canonical_names() {
        assert_eq!(validate_file_name("2024-03-15_143022.mp4"), Ok(()));
        assert_eq!(
            validate_file_name("2024-03-15_0f8fad5b-d9cb-469f-a165-70867728950e.mov"),
            Ok(())
        );
    }

    #[test]
    fn rejects_every_forbidden_character() {
        for ch in ['/', '\\', ':', '*', '?', '"', '<', '>', '|'] {
            let name = format!("2024-03-15_143022{ch}.mp4");
            assert_eq!(
                validate_file_name(&name),
                Err(ValidationError::ForbiddenCharacter(ch)),
                "{name}"
            );
        }
    }

    #[test]
    fn rejects_control_characters_and_empty() {
        assert_eq!(
            validate_file_name("clip\n.mp4"),
            Err(ValidationError::ControlCharacter)
        );
        assert_eq!(
            validate_file_name("clip\u{7f}.mp4"),
            Err(ValidationError::ControlCharacter)
        );
        assert_eq!(validate_file_name(""), Err(ValidationError::Empty));
    }

    #[test]
    fn length_limit_counts_characters() {
        let at_limit = "a".repeat(MAX_FILE_NAME_CHARS);
        assert_eq!(validate_file_name(&at_limit), Ok(()));

        let over = "a".repeat(MAX_FILE_NAME_CHARS + 1);
        assert_eq!(
            validate_file_name(&over),
            Err(ValidationError::TooLong(MAX_FILE_NAME_CHARS + 1))
        );

        let multibyte = "é".repeat(MAX_FILE_NAME_CHARS);
        assert_eq!(validate_file_name(&multibyte), Ok(()));
    }
}
