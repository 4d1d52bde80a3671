use std::collections::BTreeSet;
use std::fmt::Write;

use super::{FormView, ReportView, Section, SectionBody, SectionKind, View};

const INDENT: &str = "    ";

/// Expanded/collapsed state of report sections. Lives only as long as the
/// mounted view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disclosure {
    expanded: BTreeSet<SectionKind>,
}

impl Disclosure {
    /// Initial state on mount: every content section open, the job
    /// description echo closed.
    pub fn mount() -> Self {
        Self {
            expanded: SectionKind::ALL
                .into_iter()
                .filter(|k| *k != SectionKind::JobDescription)
                .collect(),
        }
    }

    pub fn is_expanded(&self, kind: SectionKind) -> bool {
        self.expanded.contains(&kind)
    }

    pub fn expand(&mut self, kind: SectionKind) {
        self.expanded.insert(kind);
    }

    pub fn collapse(&mut self, kind: SectionKind) {
        self.expanded.remove(&kind);
    }

    pub fn expand_all(&mut self) {
        self.expanded.extend(SectionKind::ALL);
    }
}

impl Default for Disclosure {
    fn default() -> Self {
        Self::mount()
    }
}

/// Renders a view for a terminal.
pub fn render_text(view: &View, disclosure: &Disclosure) -> String {
    let mut out = String::new();
    match view {
        View::Form(form) => render_form(&mut out, form),
        View::Loading { title, message } => {
            heading(&mut out, title);
            let _ = writeln!(out, "  ... {message}");
        }
        View::Failed {
            title,
            heading: failed,
            description,
        } => {
            heading(&mut out, title);
            let _ = writeln!(out, "  x {failed}");
            let _ = writeln!(out, "{INDENT}{description}");
        }
        View::Report(report) => render_report(&mut out, report, disclosure),
    }
    out
}

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}", "=".repeat(title.chars().count()));
}

fn render_form(out: &mut String, form: &FormView) {
    heading(out, &form.title);
    let _ = writeln!(out, "{}:", form.job_description_label);
    if form.job_description.is_empty() {
        let _ = writeln!(out, "{INDENT}(empty)");
    } else {
        write_block(out, &form.job_description);
    }
    let _ = writeln!(out, "{}: {}", form.email_label, form.email);

    for message in &form.messages {
        let _ = writeln!(out, "  ! {}", message.message);
    }
    if form.can_submit {
        let _ = writeln!(out, "[{}]", form.submit_label);
    }
}

fn render_report(out: &mut String, report: &ReportView, disclosure: &Disclosure) {
    heading(out, &report.title);
    let _ = writeln!(out, "{}% - {}", report.score, report.band_label);
    let _ = writeln!(out);

    for section in &report.sections {
        render_section(out, section, disclosure.is_expanded(section.kind));
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", report.completed_on);
}

fn render_section(out: &mut String, section: &Section, expanded: bool) {
    let marker = if expanded { 'v' } else { '>' };
    let _ = writeln!(out, "{marker} {}", section.title);
    if !expanded {
        return;
    }

    match &section.body {
        SectionBody::Text(text) => write_block(out, text),
        SectionBody::List { items, positive } => {
            let bullet = if *positive { '+' } else { '!' };
            for item in items {
                let _ = writeln!(out, "{INDENT}{bullet} {item}");
            }
        }
        SectionBody::Advice {
            candidate_label,
            candidate,
            recruiter_label,
            recruiter,
        } => {
            let _ = writeln!(out, "{INDENT}{candidate_label}: {candidate}");
            let _ = writeln!(out, "{INDENT}{recruiter_label}: {recruiter}");
        }
    }
}

fn write_block(out: &mut String, text: &str) {
    for line in text.lines() {
        let _ = writeln!(out, "{INDENT}{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::analysis::fixtures::{sample_input, sample_result};
    use crate::presenter::{present, Labels};
    use crate::session::SessionState;

    fn settled_view() -> View {
        present(
            &SessionState::Settled(sample_input(), sample_result(78)),
            &Labels::default(),
        )
    }

    #[test]
    fn test_mount_collapses_only_job_description() {
        let d = Disclosure::mount();
        assert!(!d.is_expanded(SectionKind::JobDescription));
        for kind in SectionKind::ALL.into_iter().skip(1) {
            assert!(d.is_expanded(kind), "{kind:?} should start expanded");
        }
    }

    #[test]
    fn test_sections_open_and_close_independently() {
        let mut d = Disclosure::mount();
        d.collapse(SectionKind::Concerns);
        assert!(!d.is_expanded(SectionKind::Concerns));
        assert!(d.is_expanded(SectionKind::Alignments));
        d.expand(SectionKind::Concerns);
        assert!(d.is_expanded(SectionKind::Concerns));
    }

    #[test]
    fn test_report_hides_job_description_until_expanded() {
        let view = settled_view();
        let mut d = Disclosure::mount();

        let text = render_text(&view, &d);
        assert!(text.contains("78% - Good Match"));
        assert!(text.contains("> Job Description (a@b.com)"));
        assert!(!text.contains("Frontend role, 3 yrs exp"));
        assert!(text.contains("    + 3+ years of React"));
        assert!(text.contains("    ! No Vue experience"));
        assert!(text.contains("For the recruiter: Schedule a technical screen."));

        d.expand(SectionKind::JobDescription);
        let text = render_text(&view, &d);
        assert!(text.contains("v Job Description (a@b.com)"));
        assert!(text.contains("    Frontend role, 3 yrs exp"));
    }

    #[test]
    fn test_collapsed_sections_keep_titles_only() {
        let mut d = Disclosure::mount();
        for kind in SectionKind::ALL {
            d.collapse(kind);
        }
        let text = render_text(&settled_view(), &d);
        assert!(text.contains("> Salary Alignment"));
        assert!(!text.contains("Within the posted band."));
        assert!(text.contains("Analysis completed on"));
    }

    #[test]
    fn test_failed_and_loading_render() {
        let failed = present(
            &SessionState::Failed(sample_input(), "Internal error".to_string()),
            &Labels::default(),
        );
        let text = render_text(&failed, &Disclosure::mount());
        assert!(text.contains("Analysis Failed"));
        assert!(text.contains("Internal error"));
        assert!(!text.contains('%'));

        let loading = present(&SessionState::Pending(sample_input()), &Labels::default());
        assert!(render_text(&loading, &Disclosure::mount()).contains("Analyzing job match..."));
    }

    #[test]
    fn test_form_lists_validation_messages() {
        let view = present(
            &SessionState::Editing(crate::models::analysis::AnalysisInput::new("", "x")),
            &Labels::default(),
        );
        let text = render_text(&view, &Disclosure::mount());
        assert!(text.contains("! Job description cannot be empty"));
        assert!(text.contains("! Email address must look like name@domain.tld"));
        assert!(!text.contains("[Analyze]"));
    }
}
