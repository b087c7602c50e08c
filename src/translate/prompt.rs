use crate::subtitle::SubtitleEntry;

const DEFAULT_TEMPLATE: &str = "As a language expert, translate subtitles to {language}.
It is really important that you only translate the text and keep the formatting as it is.
Do not add any extra information and keep line breaks.
Keep <i> tags as they are, do not remove them.
Include credits if they are present in the text.

Text to translate:
{text}";

/// Separator between entries in both the prompt and the expected response
pub const SEGMENT_SEPARATOR: &str = "\n\n";

/// Renders a window of entries into a single request.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    language: String,
    template: String,
}

impl PromptBuilder {
    pub fn new(target_language: &str, template: Option<&str>) -> Self {
        Self {
            language: language_code_to_name(target_language),
            template: template.unwrap_or(DEFAULT_TEMPLATE).to_string(),
        }
    }

    /// Language name as it appears in the instruction
    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn build(&self, entries: &[SubtitleEntry]) -> String {
        let text = entries
            .iter()
            .map(|entry| flatten_entry_text(&entry.text))
            .collect::<Vec<_>>()
            .join(SEGMENT_SEPARATOR);

        self.template
            .replace("{language}", &self.language)
            .replace("{text}", &text)
    }
}

/// Collapse the caption onto one line, keeping breaks before a `-` speaker marker.
pub fn flatten_entry_text(text: &str) -> String {
    let mut flat = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\n' && chars.peek() != Some(&'-') {
            flat.push(' ');
        } else {
            flat.push(c);
        }
    }
    flat.replace("</i> <i>", " ")
}

/// Convert language code to full language name for clearer prompts
pub fn language_code_to_name(code: &str) -> String {
    let name = match code.to_lowercase().as_str() {
        "ar" => "Arabic",
        "bg" => "Bulgarian",
        "ca" => "Catalan",
        "cs" => "Czech",
        "da" => "Danish",
        "de" => "German",
        "el" => "Greek",
        "en" => "English",
        "es" => "Spanish",
        "et" => "Estonian",
        "fi" => "Finnish",
        "fr" => "French",
        "he" => "Hebrew",
        "hi" => "Hindi",
        "hr" => "Croatian",
        "hu" => "Hungarian",
        "id" => "Indonesian",
        "it" => "Italian",
        "ja" => "Japanese",
        "ko" => "Korean",
        "lt" => "Lithuanian",
        "lv" => "Latvian",
        "nl" => "Dutch",
        "no" => "Norwegian",
        "pl" => "Polish",
        "pt" => "Portuguese",
        "ro" => "Romanian",
        "ru" => "Russian",
        "sk" => "Slovak",
        "sl" => "Slovenian",
        "sv" => "Swedish",
        "th" => "Thai",
        "tr" => "Turkish",
        "uk" => "Ukrainian",
        "vi" => "Vietnamese",
        "zh" => "Chinese",
        _ => return code.to_string(),
    };
    name.to_string()
}
