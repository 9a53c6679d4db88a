use std::sync::Arc;

use fluent_bundle::{FluentArgs, FluentBundle, FluentResource, FluentValue};
use unic_langid::LanguageIdentifier;

const FALLBACK_TAG: &str = "en-US";

#[derive(Clone)]
pub struct I18n {
    bundle: Arc<FluentBundle<FluentResource>>,
    fallback: Arc<FluentBundle<FluentResource>>,
}

impl I18n {
    pub fn load(lang: Option<&str>) -> Self {
        let lang_tag = lang
            .map(|s| s.to_string())
            .or_else(|| std::env::var("LANG").ok())
            .and_then(|raw| detect_lang(&raw))
            .unwrap_or_else(|| FALLBACK_TAG.to_string());
        Self {
            bundle: Arc::new(load_bundle(&lang_tag)),
            fallback: Arc::new(load_bundle(FALLBACK_TAG)),
        }
    }

    pub fn text(&self, key: &str) -> String {
        self.text_with(key, &[])
    }

    pub fn text_with(&self, key: &str, args: &[(&str, String)]) -> String {
        self.try_text(key, args).unwrap_or_else(|| key.to_string())
    }

    pub fn try_text(&self, key: &str, args: &[(&str, String)]) -> Option<String> {
        let args = (!args.is_empty()).then(|| to_fluent_args(args));
        lookup_message(&self.bundle, key, args.as_ref())
            .or_else(|| lookup_message(&self.fallback, key, args.as_ref()))
    }

    pub fn error_text(&self, code: &str, reason: &str) -> String {
        let key = format!("err-{}", code.to_ascii_lowercase().replace('_', "-"));
        self.try_text(&key, &[]).unwrap_or_else(|| {
            self.text_with("status-error", &[("message", reason.to_string())])
        })
    }
}

fn detect_lang(raw: &str) -> Option<String> {
    let token = raw.split('.').next().unwrap_or(raw);
    let token = token.split('@').next().unwrap_or(token);
    let token = token.replace('_', "-");
    if token.is_empty() || token == "C" || token == "POSIX" {
        return None;
    }
    Some(token)
}

fn load_bundle(tag: &str) -> FluentBundle<FluentResource> {
    let tag = normalize_tag(tag);
    let lang: LanguageIdentifier = tag
        .parse()
        .or_else(|_| FALLBACK_TAG.parse())
        .unwrap_or_default();
    let mut bundle = FluentBundle::new(vec![lang]);
    bundle.set_use_isolating(false);
    if let Some(res) = load_embedded(&tag) {
        let _ = bundle.add_resource(res);
    }
    bundle
}

fn load_embedded(tag: &str) -> Option<FluentResource> {
    let source = match tag {
        "en-US" => include_str!("../locales/en-US/ui.ftl"),
        "zh-CN" => include_str!("../locales/zh-CN/ui.ftl"),
        _ => return None,
    };
    match FluentResource::try_new(source.to_string()) {
        Ok(resource) => Some(resource),
        Err((resource, _errors)) => Some(resource),
    }
}

fn normalize_tag(tag: &str) -> String {
    let token = tag.replace('_', "-");
    if token.starts_with("zh") {
        return "zh-CN".to_string();
    }
    if token.starts_with("en") {
        return FALLBACK_TAG.to_string();
    }
    token
}

fn lookup_message(
    bundle: &FluentBundle<FluentResource>,
    key: &str,
    args: Option<&FluentArgs>,
) -> Option<String> {
    let msg = bundle.get_message(key)?;
    let pattern = msg.value()?;
    let mut errors = Vec::new();
    let value = bundle.format_pattern(pattern, args, &mut errors);
    if errors.is_empty() {
        Some(value.to_string())
    } else {
        None
    }
}

fn to_fluent_args<'a>(values: &[(&'a str, String)]) -> FluentArgs<'a> {
    let mut args = FluentArgs::new();
    for (k, v) in values {
        args.set(*k, FluentValue::from(v.clone()));
    }
    args
}
