use crate::api::Conversion;
use std::fmt;

/// Text summary of one conversion
pub struct TextReport<'a> {
    conversion: &'a Conversion,
}

impl<'a> TextReport<'a> {
    /// Creates a new text report
    pub fn new(conversion: &'a Conversion) -> Self {
        Self { conversion }
    }
}

impl<'a> fmt::Display for TextReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let conversion = self.conversion;

        writeln!(f, "NCIRF Conversion")?;
        writeln!(f, "================")?;
        writeln!(f)?;
        writeln!(
            f,
            "Phantom:        age group {}, {}",
            conversion.phantom_age_group.number(),
            conversion.sex.simple_name()
        )?;
        match &conversion.isocenter {
            Some(resolved) => writeln!(
                f,
                "Isocenter:      {} ({})",
                resolved.isocenter, resolved.source
            )?,
            None => writeln!(f, "Isocenter:      not resolved")?,
        }
        writeln!(f, "Events:         {}", conversion.total_events)?;
        writeln!(f, "Rows written:   {}", conversion.rows.len())?;
        writeln!(f, "Zero dose:      {}", conversion.zero_dose_events)?;
        writeln!(f, "Skipped:        {}", conversion.skipped.len())?;

        if !conversion.skipped.is_empty() {
            writeln!(f)?;
            writeln!(f, "Skipped Events")?;
            writeln!(f, "--------------")?;
            for skipped in &conversion.skipped {
                writeln!(
                    f,
                    "#{:<4} {:<28} {}",
                    skipped.index,
                    skipped.field.as_deref().unwrap_or("-"),
                    skipped.reason
                )?;
            }
        }

        Ok(())
    }
}
