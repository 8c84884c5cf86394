// src/extract/language.rs
//! Dominant-language guess for cleaned article text.

/// Characters of text fed to the detector.
pub const SAMPLE_CHARS: usize = 1000;

/// ISO 639-1 code of the text's dominant language, or `None` when the text is
/// empty or the detector has no answer.
pub fn detect_language(text: &str) -> Option<String> {
    let sample: String = text.chars().take(SAMPLE_CHARS).collect();
    if sample.trim().is_empty() {
        return None;
    }
    let info = whatlang::detect(&sample)?;
    let code = iso639_1(info.lang().code());
    if code.is_none() {
        tracing::debug!(target: "extract", lang = info.lang().code(), "no ISO 639-1 code for detected language");
    }
    code.map(str::to_string)
}

/// Map the detector's ISO 639-3 codes onto ISO 639-1.
fn iso639_1(code3: &str) -> Option<&'static str> {
    let code = match code3 {
        "afr" => "af",
        "aka" => "ak",
        "amh" => "am",
        "ara" => "ar",
        "aze" => "az",
        "bel" => "be",
        "ben" => "bn",
        "bul" => "bg",
        "cat" => "ca",
        "ces" => "cs",
        "cmn" => "zh",
        "dan" => "da",
        "deu" => "de",
        "ell" => "el",
        "eng" => "en",
        "epo" => "eo",
        "est" => "et",
        "fin" => "fi",
        "fra" => "fr",
        "guj" => "gu",
        "heb" => "he",
        "hin" => "hi",
        "hrv" => "hr",
        "hun" => "hu",
        "hye" => "hy",
        "ind" => "id",
        "ita" => "it",
        "jav" => "jv",
        "jpn" => "ja",
        "kan" => "kn",
        "kat" => "ka",
        "khm" => "km",
        "kor" => "ko",
        "lat" => "la",
        "lav" => "lv",
        "lit" => "lt",
        "mal" => "ml",
        "mar" => "mr",
        "mkd" => "mk",
        "mya" => "my",
        "nep" => "ne",
        "nld" => "nl",
        "nob" => "nb",
        "ori" => "or",
        "pan" => "pa",
        "pes" => "fa",
        "pol" => "pl",
        "por" => "pt",
        "ron" => "ro",
        "rus" => "ru",
        "sin" => "si",
        "slk" => "sk",
        "slv" => "sl",
        "sna" => "sn",
        "spa" => "es",
        "srp" => "sr",
        "swe" => "sv",
        "tam" => "ta",
        "tel" => "te",
        "tgl" => "tl",
        "tha" => "th",
        "tuk" => "tk",
        "tur" => "tr",
        "ukr" => "uk",
        "urd" => "ur",
        "uzb" => "uz",
        "vie" => "vi",
        "yid" => "yi",
        "zul" => "zu",
        _ => return None,
    };
    Some(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_english_and_spanish() {
        let en = "The city council approved the new budget on Tuesday after a long debate \
                  about public transport, housing and the future of the harbour district.";
        assert_eq!(detect_language(en).as_deref(), Some("en"));

        let es = "El ayuntamiento aprobó el nuevo presupuesto el martes después de un largo \
                  debate sobre el transporte público, la vivienda y el futuro del puerto.";
        assert_eq!(detect_language(es).as_deref(), Some("es"));
    }

    #[test]
    fn empty_text_has_no_language() {
        assert_eq!(detect_language(""), None);
        assert_eq!(detect_language("   \n\n  "), None);
    }
}
