use console::style;
use recap_core::{BackendStatus, RequestState, SummaryResult, format::format_duration_minutes};

pub fn render_state(state: &RequestState) -> String {
    match state {
        RequestState::Idle => String::new(),
        RequestState::Pending => format!("{}", style("Analyzing...").dim()),
        RequestState::Failed(message) => {
            format!("{} {}", style("✗").red().bold(), style(message).red())
        }
        RequestState::Succeeded(result) => render_result(result),
    }
}

/// Video card, executive summary and key points.
pub fn render_result(result: &SummaryResult) -> String {
    let video = &result.video_info;
    let summary = &result.summary;
    let mut output = String::new();

    output.push_str(&format!("\n{}\n", style(&video.title).bold()));
    output.push_str(&format!(
        "{}  {}\n",
        style(&video.channel).dim(),
        style(format!(
            "{} mins",
            format_duration_minutes(video.duration_seconds)
        ))
        .dim()
    ));
    output.push_str(&format!("{}\n\n", style("─".repeat(60)).dim()));

    output.push_str(&format!("{}\n", style("Executive Summary").cyan().bold()));
    output.push_str(&summary.full_summary);
    output.push_str("\n\n");

    output.push_str(&format!("{}\n", style("Key Points").cyan().bold()));
    for (i, point) in summary.key_points.iter().enumerate() {
        output.push_str(&format!(
            "{}. {}\n   {}\n",
            i + 1,
            style(&point.title).bold(),
            point.content
        ));
    }

    output
}

pub fn render_backend_status(status: &BackendStatus) -> String {
    let text = status.to_string();
    let styled = if status.is_connected() {
        style(text).green()
    } else {
        style(text).red()
    };
    format!("{} {}", style("Backend Status:").dim(), styled)
}
