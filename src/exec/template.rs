//! Placeholder substitution for command templates
//!
//! Model commands understand `{model}` and `{message}`. Profile commands
//! understand `{profile}`, `{models_csv}` and `{models_spaced}`.

use crate::config::ProfileSpec;

/// Fill `{model}` and `{message}`; missing values render as empty strings
pub fn fill_model_template(argv: &[String], model: Option<&str>, message: Option<&str>) -> Vec<String> {
    argv.iter()
        .map(|part| {
            part.replace("{model}", model.unwrap_or(""))
                .replace("{message}", message.unwrap_or(""))
        })
        .collect()
}

/// Fill the profile placeholders from `profile`
pub fn fill_profile_template(argv: &[String], profile: &ProfileSpec) -> Vec<String> {
    let models_csv = profile.models.join(",");
    let models_spaced = profile
        .models
        .iter()
        .map(|m| shell_quote(m))
        .collect::<Vec<_>>()
        .join(" ");

    argv.iter()
        .map(|part| {
            part.replace("{profile}", &profile.name)
                .replace("{models_csv}", &models_csv)
                .replace("{models_spaced}", &models_spaced)
        })
        .collect()
}

/// POSIX shell quoting: safe words pass through, everything else is
/// single-quoted
pub fn shell_quote(word: &str) -> String {
    if word.is_empty() {
        return "''".to_string();
    }

    let safe = word
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "@%+=:,./-_".contains(c));
    if safe {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', "'\"'\"'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_fill_model() {
        let cmd = argv(&["ollama", "run", "{model}", "--note={message}"]);
        let filled = fill_model_template(&cmd, Some("qwen2.5:7b"), None);
        assert_eq!(filled, argv(&["ollama", "run", "qwen2.5:7b", "--note="]));
    }

    #[test]
    fn test_fill_profile() {
        let profile = ProfileSpec {
            name: "night".to_string(),
            models: vec!["a:7b".to_string(), "b c".to_string()],
            ram_gb: None,
        };
        let cmd = argv(&["switch", "{profile}", "{models_csv}", "{models_spaced}"]);
        let filled = fill_profile_template(&cmd, &profile);
        assert_eq!(filled, argv(&["switch", "night", "a:7b,b c", "a:7b 'b c'"]));
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("plain-word_1.0"), "plain-word_1.0");
        assert_eq!(shell_quote(""), "''");
        assert_eq!(shell_quote("it's"), "'it'\"'\"'s'");
    }
}
