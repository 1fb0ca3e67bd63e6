//! Internationalization (i18n) for GoldenFE.
//!
//! Embedded `key=value` locale files, looked up through `t!("key")`. Missing
//! keys fall back to English, then to the key itself.

use std::collections::HashMap;
use std::sync::Mutex;

static I18N: Mutex<Option<I18nState>> = Mutex::new(None);

struct I18nState {
    current_lang: String,
    /// lang_code → (key → translated_string)
    translations: HashMap<String, HashMap<String, String>>,
}

/// Supported languages: (code, native_name)
pub const LANGUAGES: &[(&str, &str)] = &[("en", "English"), ("ru", "Русский")];

const EN: &str = include_str!("../locales/en.txt");
const RU: &str = include_str!("../locales/ru.txt");

/// Load the embedded translations. Call once at startup.
pub fn init() {
    let mut translations: HashMap<String, HashMap<String, String>> = HashMap::new();
    translations.insert("en".to_string(), parse_translations(EN));
    translations.insert("ru".to_string(), parse_translations(RU));

    let state = I18nState {
        current_lang: "en".to_string(),
        translations,
    };
    if let Ok(mut guard) = I18N.lock() {
        *guard = Some(state);
    }
}

/// Set the active language. Unknown codes fall back to "en".
pub fn set_language(code: &str) {
    if let Ok(mut guard) = I18N.lock()
        && let Some(ref mut state) = *guard
    {
        if state.translations.contains_key(code) {
            state.current_lang = code.to_string();
        } else {
            state.current_lang = "en".to_string();
        }
    }
}

pub fn current_language() -> String {
    if let Ok(guard) = I18N.lock()
        && let Some(ref state) = *guard
    {
        return state.current_lang.clone();
    }
    "en".to_string()
}

/// Look up `key` in the current language, then English, then return the key.
pub fn translate(key: &str) -> String {
    if let Ok(guard) = I18N.lock()
        && let Some(ref state) = *guard
    {
        if let Some(map) = state.translations.get(&state.current_lang)
            && let Some(val) = map.get(key)
        {
            return val.clone();
        }
        if state.current_lang != "en"
            && let Some(map) = state.translations.get("en")
            && let Some(val) = map.get(key)
        {
            return val.clone();
        }
    }
    key.to_string()
}

/// Pick the UI language: an explicit configured code wins, otherwise the
/// system locale, otherwise English.
pub fn resolve_language(configured: &str) -> String {
    let configured = configured.trim();
    if !configured.is_empty()
        && let Some(code) = match_system_locale(configured)
    {
        return code;
    }
    detect_system_language()
}

/// Best supported match for the system locale, or "en".
pub fn detect_system_language() -> String {
    #[cfg(target_os = "windows")]
    {
        if let Some(lang) = detect_windows_language() {
            return lang;
        }
    }

    for var in &["LANG", "LC_ALL", "LC_MESSAGES", "LANGUAGE"] {
        if let Ok(val) = std::env::var(var)
            && let Some(lang) = match_system_locale(&val)
        {
            return lang;
        }
    }

    "en".to_string()
}

#[cfg(target_os = "windows")]
fn detect_windows_language() -> Option<String> {
    use std::ffi::OsString;
    use std::os::windows::ffi::OsStringExt;

    unsafe extern "system" {
        fn GetUserDefaultLocaleName(lp_locale_name: *mut u16, cch_locale_name: i32) -> i32;
    }

    let mut buf = [0u16; 85]; // LOCALE_NAME_MAX_LENGTH
    let len = unsafe { GetUserDefaultLocaleName(buf.as_mut_ptr(), buf.len() as i32) };
    if len > 0 {
        let os_str = OsString::from_wide(&buf[..((len - 1) as usize)]);
        if let Some(locale_str) = os_str.to_str() {
            return match_system_locale(locale_str);
        }
    }
    None
}

/// Match a locale string ("ru_RU.UTF-8", "en-GB", "ru") to a supported code.
fn match_system_locale(locale: &str) -> Option<String> {
    let normalized = locale.to_lowercase().replace('_', "-");
    let lang_part = normalized.split('.').next().unwrap_or(&normalized);
    let lang_part = lang_part.split('@').next().unwrap_or(lang_part);
    let primary = lang_part.split('-').next().unwrap_or(lang_part);

    LANGUAGES
        .iter()
        .find(|(code, _)| *code == lang_part || *code == primary)
        .map(|(code, _)| code.to_string())
}

/// Parse a `key=value` translation file. `#` starts a comment line.
fn parse_translations(data: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in data.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, val)) = line.split_once('=') {
            map.insert(key.trim().to_string(), val.trim().to_string());
        }
    }
    map
}

/// Translation macro. Usage: `t!("tab.calculator")` or
/// `t!("notice.saved", path = p.display())`
#[macro_export]
macro_rules! t {
    ($key:expr) => {
        $crate::i18n::translate($key)
    };
    ($key:expr, $($name:ident = $val:expr),+ $(,)?) => {{
        let mut s = $crate::i18n::translate($key);
        $(
            s = s.replace(concat!("{", stringify!($name), "}"), &format!("{}", $val));
        )+
        s
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locales_share_keys() {
        let en = parse_translations(EN);
        let ru = parse_translations(RU);
        let mut missing: Vec<_> = en.keys().filter(|k| !ru.contains_key(*k)).collect();
        missing.sort();
        assert!(missing.is_empty(), "ru is missing {:?}", missing);
        assert_eq!(en.len(), ru.len());
    }

    #[test]
    fn parse_skips_comments_and_blank_lines() {
        let map = parse_translations("# header\n\n a = b = c \nnoequals\n");
        assert_eq!(map.len(), 1);
        assert_eq!(map["a"], "b = c");
    }

    #[test]
    fn locale_matching() {
        assert_eq!(match_system_locale("ru_RU.UTF-8").as_deref(), Some("ru"));
        assert_eq!(match_system_locale("en-GB").as_deref(), Some("en"));
        assert_eq!(match_system_locale("de_DE"), None);
    }

    #[test]
    fn configured_language_wins() {
        assert_eq!(resolve_language("ru"), "ru");
        assert_eq!(resolve_language(" en "), "en");
    }

    #[test]
    fn unknown_key_falls_back_to_key() {
        assert_eq!(translate("no.such.key.anywhere"), "no.such.key.anywhere");
    }
}
