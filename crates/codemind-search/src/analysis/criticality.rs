//! Criticality Analyzer (C6).
//!
//! Grounded on `examples/original_source/src/analysis/criticality_analyzer.py`'s
//! security lexicon, error-handling token sets, and critical-decorator lists.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use codemind_core::parser::SupportedLanguage;

const SECURITY_LEXICON: &[&str] = &[
    "password", "passwd", "secret", "token", "api_key", "apikey", "auth", "authenticate",
    "authorization", "credential", "private_key", "public_key", "encrypt", "decrypt", "hash",
    "salt", "signature", "sign", "verify", "session", "cookie", "jwt", "oauth", "sso", "login",
    "logout", "permission", "access_control", "acl", "sudo", "root", "admin", "privilege",
    "sanitize", "escape", "injection", "xss", "csrf", "vulnerability", "exploit", "payload",
    "firewall", "certificate", "ssl", "tls",
];

const ENTRY_POINT_FILENAMES: &[&str] = &["main", "index", "app", "init", "server", "api", "cli"];
const ENTRY_POINT_PATH_COMPONENTS: &[&str] = &["api", "core", "routes", "endpoints", "handlers"];

static WORD_BOUNDARY_CACHE: Lazy<std::sync::Mutex<std::collections::HashMap<&'static str, Regex>>> =
    Lazy::new(|| std::sync::Mutex::new(std::collections::HashMap::new()));

fn word_count(content_lower: &str, word: &'static str) -> usize {
    let mut cache = WORD_BOUNDARY_CACHE.lock().unwrap();
    let re = cache
        .entry(word)
        .or_insert_with(|| Regex::new(&format!(r"\b{}\b", regex::escape(word))).unwrap());
    re.find_iter(content_lower).count()
}

fn error_handling_tokens(language: SupportedLanguage) -> &'static [&'static str] {
    use SupportedLanguage::*;
    match language {
        Python | Ruby => &["try", "except", "finally", "raise"],
        JavaScript | TypeScript | Tsx => &["try", "catch", "finally", "throw"],
        Java | CSharp | Kotlin => &["try", "catch", "finally", "throw", "throws"],
        Go => &["if err != nil", "panic", "recover"],
        Rust => &["Result", "?", "unwrap", "expect", "panic!"],
        _ => &["try", "catch", "finally", "throw"],
    }
}

fn critical_decorators(language: SupportedLanguage) -> &'static [&'static str] {
    use SupportedLanguage::*;
    match language {
        Python => &[
            "@app.route",
            "@login_required",
            "@permission_required",
            "@csrf_exempt",
            "@transaction.atomic",
        ],
        JavaScript | TypeScript | Tsx => &["@Controller", "@Injectable", "@Authorized", "@UseGuards"],
        Java => &["@RequestMapping", "@PreAuthorize", "@Secured", "@Transactional"],
        Go | Rust => &[],
        _ => &[],
    }
}

#[derive(Debug, Clone, Default)]
pub struct CriticalityMetrics {
    pub security_keyword_count: usize,
    pub has_error_handling: bool,
    pub has_critical_decorator: bool,
    pub proximity_score: f32,
    pub criticality_boost: f32,
}

pub struct CriticalityAnalyzer;

impl CriticalityAnalyzer {
    pub fn analyze(name: &str, content: &str, language: SupportedLanguage, file_path: &str) -> CriticalityMetrics {
        let haystack = format!("{} {}", name.to_lowercase(), content.to_lowercase());

        let security_keyword_count: usize = SECURITY_LEXICON
            .iter()
            .map(|kw| word_count(&haystack, kw))
            .sum();

        let has_error_handling = error_handling_tokens(language)
            .iter()
            .any(|token| content.contains(token));

        let has_critical_decorator = critical_decorators(language)
            .iter()
            .any(|dec| content.contains(dec));

        let proximity_score = Self::proximity(name, file_path);

        let security_boost = match security_keyword_count {
            0 => 0.0,
            1 => 0.02,
            2 => 0.06,
            _ => 0.10,
        };
        let error_boost = if has_error_handling { 0.03 } else { 0.0 };
        let decorator_boost = if has_critical_decorator { 0.05 } else { 0.0 };
        let proximity_boost = proximity_score * 0.02;

        let criticality_boost =
            (security_boost + error_boost + decorator_boost + proximity_boost).clamp(0.0, 0.3);

        CriticalityMetrics {
            security_keyword_count,
            has_error_handling,
            has_critical_decorator,
            proximity_score,
            criticality_boost,
        }
    }

    /// Tolerates non-path/empty input: logs and contributes 0.
    fn proximity(function_name: &str, file_path: &str) -> f32 {
        if file_path.trim().is_empty() {
            warn!("criticality analyzer received empty file path, skipping proximity score");
            return 0.0;
        }

        let path = std::path::Path::new(file_path);
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();

        let filename_hit = ENTRY_POINT_FILENAMES.contains(&stem.as_str())
            || file_path
                .to_lowercase()
                .split(['/', '\\'])
                .any(|part| ENTRY_POINT_PATH_COMPONENTS.contains(&part));
        let name_hit = ENTRY_POINT_FILENAMES.contains(&function_name.to_lowercase().as_str());

        let depth = file_path.split(['/', '\\']).filter(|p| !p.is_empty()).count();
        let depth_component = (1.0 - (depth.min(10) as f32 / 10.0)) * 0.2;

        let mut score = depth_component;
        if filename_hit {
            score += 0.5;
        }
        if name_hit {
            score += 0.3;
        }
        score.clamp(0.0, 1.0)
    }
}
