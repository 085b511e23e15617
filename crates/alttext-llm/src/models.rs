use alttext_core::generator::DEFAULT_MODEL;

/// Vision-capable chat models known to work for alt text.
#[derive(Clone, Debug)]
pub struct VisionModelInfo {
    pub name: &'static str,
    pub display_name: &'static str,
    pub provider: &'static str,
    pub max_output: u32,
}

pub static LLAMA_4_SCOUT: VisionModelInfo = VisionModelInfo {
    name: DEFAULT_MODEL,
    display_name: "Llama 4 Scout",
    provider: "groq",
    max_output: 8_192,
};

pub static LLAMA_4_MAVERICK: VisionModelInfo = VisionModelInfo {
    name: "meta-llama/llama-4-maverick-17b-128e-instruct",
    display_name: "Llama 4 Maverick",
    provider: "groq",
    max_output: 8_192,
};

pub static GPT_4O_MINI: VisionModelInfo = VisionModelInfo {
    name: "gpt-4o-mini",
    display_name: "GPT-4o mini",
    provider: "openai",
    max_output: 16_384,
};

static ALL_MODELS: &[&VisionModelInfo] = &[&LLAMA_4_SCOUT, &LLAMA_4_MAVERICK, &GPT_4O_MINI];

pub fn find_model(name: &str) -> Option<&'static VisionModelInfo> {
    ALL_MODELS.iter().copied().find(|m| m.name == name)
}

pub fn default_model() -> &'static VisionModelInfo {
    &LLAMA_4_SCOUT
}

pub fn all_models() -> &'static [&'static VisionModelInfo] {
    ALL_MODELS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_known_model() {
        let m = find_model("gpt-4o-mini").unwrap();
        assert_eq!(m.provider, "openai");
    }

    #[test]
    fn unknown_model_is_none() {
        assert!(find_model("not-a-model").is_none());
    }

    #[test]
    fn default_is_scout() {
        assert_eq!(default_model().name, "meta-llama/llama-4-scout-17b-16e-instruct");
    }

    #[test]
    fn model_names_unique() {
        let mut names: Vec<_> = all_models().iter().map(|m| m.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), all_models().len());
    }
}
