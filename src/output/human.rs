//! Human-friendly output implementation using console.

use console::Term;
use tracing::{debug, instrument, trace};

use crate::error::BoothError;
use crate::export::Notice;
use crate::layout::{Arrangement, Placement};
use crate::style::StyleAxis;
use crate::theme::BoothTheme;

use super::{ArrangeReport, CaptureReport, ContrastReport, Output, StyleCatalog, VersionInfo};

/// Styled terminal output implementation for people.
pub struct HumanOutput {
    term: Term,
    theme: BoothTheme,
}

impl HumanOutput {
    #[instrument(skip(term))]
    pub fn new(term: Term) -> Self {
        debug!("Creating HumanOutput");
        Self {
            term,
            theme: BoothTheme::default(),
        }
    }

    fn line(&self, text: &str) {
        // a closed stdout (e.g. `| head`) is not worth failing the command over
        let _ = self.term.write_line(text);
    }

    fn field(&self, label: &str, value: &str) {
        self.line(&format!(
            "  {} {}",
            self.theme.label.apply_to(format!("{label}:")),
            self.theme.value.apply_to(value)
        ));
    }

    fn describe(placement: &Placement) -> String {
        match *placement {
            Placement::Stack { row } => format!("row {row}"),
            Placement::Flow { z_index, stagger } => format!("z {z_index}, stagger {stagger:?}"),
            Placement::Grid {
                row,
                column,
                row_span,
                column_span,
            } => format!("row {row} col {column}, span {row_span}x{column_span}"),
            Placement::Flex { row, weight } => format!("row {row}, weight {weight}"),
        }
    }

    /// Occupancy map of a grid arrangement, one text line per track row.
    fn grid_map(arrangement: &Arrangement) -> Vec<String> {
        let rows = arrangement.row_count();
        let columns = arrangement.columns as usize;
        let mut map = vec![vec![String::from("."); columns]; rows];
        for cell in &arrangement.cells {
            if let Placement::Grid {
                row,
                column,
                row_span,
                column_span,
            } = cell.placement
            {
                for r in row..row + row_span {
                    for c in column..column + column_span {
                        if let Some(slot) = map
                            .get_mut(r as usize)
                            .and_then(|line| line.get_mut(c as usize))
                        {
                            *slot = cell.snapshot.to_string();
                        }
                    }
                }
            }
        }
        map.into_iter()
            .map(|line| {
                line.iter()
                    .map(|s| format!("{s:>3}"))
                    .collect::<String>()
            })
            .collect()
    }
}

impl Output for HumanOutput {
    #[instrument(skip(self))]
    fn success(&self, message: &str) {
        self.line(&format!("{} {message}", self.theme.success.apply_to("[OK]")));
    }

    #[instrument(skip(self))]
    fn error(&self, error: &BoothError) {
        debug!(
            error = %error,
            recoverable = error.is_user_recoverable(),
            "Outputting error"
        );
        let stderr = Term::stderr();
        let _ = stderr.write_line(&format!(
            "{} {}",
            self.theme.error.apply_to("Error:"),
            error
        ));
        if let Some(suggestion) = error.suggestion() {
            trace!(suggestion, "Adding suggestion");
            let _ = stderr.write_line(&format!(
                "{} {}",
                self.theme.warning.apply_to("Hint:"),
                self.theme.muted.apply_to(suggestion)
            ));
        }
    }

    #[instrument(skip(self))]
    fn warning(&self, message: &str) {
        self.line(&format!("{} {message}", self.theme.warning.apply_to("[WARN]")));
    }

    fn capture_report(&self, report: &CaptureReport) {
        self.line(&self.theme.header.apply_to("Capture session").to_string());
        self.field("Photos", &format!("{}/{}", report.photos, report.requested));
        if report.missed > 0 {
            self.field("Missed", &report.missed.to_string());
        }
        self.field("Filter", report.filter.label());
        self.field("Effect", &format!("{:?}", report.effect));
        self.field("Camera", &format!("{:?}", report.facing));
        self.field("Session", &report.session_dir.display().to_string());
        for shot in &report.shots {
            self.field("Saved", &shot.display().to_string());
        }
        self.field("Next", report.next_view);
    }

    fn arrangement(&self, report: &ArrangeReport) {
        if let Some(text) = report.placeholder {
            self.line(&self.theme.muted.apply_to(text).to_string());
            return;
        }
        let arrangement = &report.arrangement;
        self.line(&format!(
            "{} {}",
            self.theme.header.apply_to(arrangement.layout.label()),
            self.theme.muted.apply_to(format!(
                "({} photos, {} columns, {} rows, gap {}px)",
                report.photos, arrangement.columns, report.rows, arrangement.gap
            ))
        ));

        for cell in &arrangement.cells {
            let mut line = format!(
                "  {} {}",
                self.theme.index.apply_to(format!("#{}", cell.snapshot)),
                Self::describe(&cell.placement)
            );
            if cell.rotation_deg != 0 {
                line.push_str(&format!(", tilt {}°", cell.rotation_deg));
            }
            if cell.emphasized {
                line.push_str(&format!(" {}", self.theme.feature.apply_to("feature")));
            }
            self.line(&line);
        }

        if arrangement
            .cells
            .iter()
            .any(|c| matches!(c.placement, Placement::Grid { .. }))
        {
            self.line("");
            for row in Self::grid_map(arrangement) {
                self.line(&format!("  {}", self.theme.muted.apply_to(row)));
            }
        }
    }

    fn notice(&self, notice: &Notice) {
        match notice {
            Notice::Saved { filename, location } => {
                self.success(&format!("Saved {filename} to {}", location.display()));
            }
            Notice::NoPhotos => self.warning("No photos to export"),
            Notice::Busy => self.warning("An export is already running"),
            Notice::Failed { message, retryable } => {
                let _ = Term::stderr().write_line(&format!(
                    "{} {message}",
                    self.theme.error.apply_to("[FAILED]")
                ));
                if *retryable {
                    self.line(&self.theme.muted.apply_to("Run the export again to retry.").to_string());
                }
            }
        }
    }

    fn contrast(&self, report: &ContrastReport) {
        let verdict = if report.readable {
            self.theme.success.apply_to("readable")
        } else {
            self.theme.error.apply_to("too faint")
        };
        let background = match report.background_label {
            Some(label) => format!("██ {} ({label})", report.background),
            None => format!("██ {}", report.background),
        };
        self.line(&format!(
            "{} on {}: {verdict}",
            BoothTheme::swatch(report.text).apply_to(format!("██ {}", report.text)),
            BoothTheme::swatch(report.background).apply_to(background),
        ));
        self.field(
            "Distance",
            &format!("{} (minimum {})", report.distance, report.threshold),
        );
        if report.check.was_substituted() {
            self.field("Replacement", &report.check.color().to_string());
        }
    }

    fn styles(&self, catalog: &StyleCatalog) {
        for axis in &catalog.axes {
            self.line(&self.theme.header.apply_to(axis.axis).to_string());
            for option in &axis.options {
                let marker = if option.id == axis.default { "*" } else { " " };
                self.line(&format!(
                    "  {marker} {:<12} {}",
                    option.id,
                    self.theme.muted.apply_to(option.label)
                ));
            }
        }
        for (title, swatches) in [
            ("background", catalog.backgrounds),
            ("text color", catalog.text_colors),
        ] {
            self.line(&self.theme.header.apply_to(title).to_string());
            for swatch in swatches {
                self.line(&format!(
                    "    {} {} {}",
                    BoothTheme::swatch(swatch.rgb()).apply_to("██"),
                    swatch.hex,
                    self.theme.muted.apply_to(swatch.label)
                ));
            }
        }
    }

    fn version_info(&self, info: &VersionInfo) {
        self.line(&format!("booth {}", info.version));
        self.line(&format!(
            "git: {}{}",
            info.git_sha,
            if info.git_dirty { " (dirty)" } else { "" }
        ));
        self.line(&format!("built: {}", info.build_date));
        self.line(&format!("rustc: {}", info.rustc_version));
        self.line(&format!("target: {}", info.target));
    }
}
