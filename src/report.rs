//! Text rendering of a `PresentationRecord`.

use std::fmt;

use crate::metadata::Language;
use crate::pipeline::FormOptions;
use crate::presenter::PresentationRecord;

struct Strings {
    recommended: &'static str,
    details: &'static str,
    npk: &'static str,
    usage: &'static str,
    dosage: &'static str,
    alternatives: &'static str,
}

fn strings(language: Language) -> &'static Strings {
    const EN: Strings = Strings {
        recommended: "Recommended Fertilizer",
        details: "Fertilizer Details",
        npk: "NPK Ratio",
        usage: "Usage",
        dosage: "Recommended Dosage",
        alternatives: "Top Fertilizer Alternatives",
    };
    const HI: Strings = Strings {
        recommended: "अनुशंसित उर्वरक",
        details: "उर्वरक विवरण",
        npk: "NPK अनुपात",
        usage: "उपयोग",
        dosage: "अनुशंसित मात्रा",
        alternatives: "शीर्ष वैकल्पिक उर्वरक",
    };
    match language {
        Language::En => &EN,
        Language::Hi => &HI,
    }
}

/// Language-aware text form of a record.
pub struct TextReport<'a>(pub &'a PresentationRecord);

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = self.0;
        let s = strings(record.language);
        writeln!(f, "✅ {}: {}", s.recommended, record.recommendation)?;

        if let Some(d) = &record.details {
            writeln!(f, "\n📋 {}", s.details)?;
            writeln!(f, "{}: {}", s.npk, d.npk)?;
            writeln!(f, "{}: {}", s.usage, d.usage)?;
            writeln!(f, "{}: {}", s.dosage, d.dosage)?;
        }

        if let Some(alts) = &record.alternatives {
            writeln!(f, "\n🔄 {}", s.alternatives)?;
            for a in alts {
                writeln!(f, "- {} ({:.2}%)", a.label, a.percentage)?;
            }
        }
        Ok(())
    }
}

pub struct OptionsReport<'a>(pub &'a FormOptions);

impl fmt::Display for OptionsReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let options = self.0;
        let b = &options.bounds;
        writeln!(f, "Soil types: {}", options.soil_types.join(", "))?;
        writeln!(f, "Crop types: {}", options.crop_types.join(", "))?;
        for (name, bounds) in [
            ("Nitrogen (N)", b.nitrogen),
            ("Potassium (K)", b.potassium),
            ("Phosphorous (P)", b.phosphorous),
            ("Soil pH", b.ph),
            ("Rainfall (mm)", b.rainfall),
        ] {
            writeln!(
                f,
                "{name}: {} to {} (default {})",
                bounds.min, bounds.max, bounds.default
            )?;
        }
        Ok(())
    }
}

pub fn render_text(record: &PresentationRecord) -> String {
    TextReport(record).to_string()
}

pub fn render_options(options: &FormOptions) -> String {
    OptionsReport(options).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::FertilizerDetails;
    use crate::presenter::Alternative;

    fn record(language: Language) -> PresentationRecord {
        PresentationRecord {
            language,
            recommendation: "Urea".into(),
            details: Some(FertilizerDetails {
                npk: "46-0-0".into(),
                usage: "Boosts nitrogen levels; use during vegetative stage.".into(),
                dosage: "50-70 kg per acre".into(),
            }),
            alternatives: Some(vec![
                Alternative { label: "Urea".into(), percentage: 71.5 },
                Alternative { label: "DAP".into(), percentage: 20.0 },
            ]),
            nutrients: None,
        }
    }

    #[test]
    fn english_report() {
        let text = render_text(&record(Language::En));
        assert!(text.starts_with("✅ Recommended Fertilizer: Urea\n"));
        assert!(text.contains("NPK Ratio: 46-0-0"));
        assert!(text.contains("Recommended Dosage: 50-70 kg per acre"));
        assert!(text.contains("- Urea (71.50%)\n- DAP (20.00%)"));
    }

    #[test]
    fn hindi_report_without_optional_blocks() {
        let mut r = record(Language::Hi);
        r.details = None;
        r.alternatives = None;
        assert_eq!(render_text(&r), "✅ अनुशंसित उर्वरक: Urea\n");
    }

    #[test]
    fn options_listing() {
        let options = FormOptions::new(&crate::vocab::Vocabularies::default());
        let text = render_options(&options);
        assert!(text.starts_with("Soil types: Sandy, Loamy, Clayey, Red, Black\n"));
        assert!(text.contains("Soil pH: 0 to 14 (default 6.5)"));
        assert!(text.contains("Rainfall (mm): 0 to 500 (default 100)"));
    }
}
