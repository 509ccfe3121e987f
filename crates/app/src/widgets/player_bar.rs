use stamp_engine::SessionSnapshot;
use stamp_engine::time::format_seconds;

/// Values needed by the UI to draw the progress bar and its label.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerBarRenderModel {
    pub playhead_x: f32,
    pub label: String,
    pub playing: bool,
}

/// Interaction result emitted by the progress bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerBarInteraction {
    Scrubbed(f64),
    PlayPressed,
    PausePressed,
}

/// Builds draw data for the progress bar.
///
/// The label reads `position / duration`, or just the position while the
/// duration is still unknown.
pub fn build_render_model(snapshot: &SessionSnapshot, width_px: f32) -> PlayerBarRenderModel {
    let safe_width = width_px.max(0.0);
    let position = snapshot.position_seconds;
    let duration = snapshot.duration_seconds;

    let (playhead_x, label) = if duration == 0 {
        (0.0, format_seconds(position))
    } else {
        let clamped = position.min(duration);
        (
            clamped as f32 / duration as f32 * safe_width,
            format!("{} / {}", format_seconds(clamped), format_seconds(duration)),
        )
    };

    PlayerBarRenderModel {
        playhead_x,
        label,
        playing: snapshot.playing,
    }
}

/// Maps a pointer X position into seconds for scrubbing.
pub fn scrub_seconds_at_x(x_px: f32, width_px: f32, duration_seconds: u64) -> f64 {
    if duration_seconds == 0 || width_px <= 0.0 {
        return 0.0;
    }

    let normalized = f64::from((x_px / width_px).clamp(0.0, 1.0));
    (normalized * duration_seconds as f64).round()
}

/// Creates a scrub interaction from a click or drag on the bar.
pub fn click_at_x(x_px: f32, width_px: f32, duration_seconds: u64) -> PlayerBarInteraction {
    PlayerBarInteraction::Scrubbed(scrub_seconds_at_x(x_px, width_px, duration_seconds))
}
