//! Toolkit-independent UI state and the engine worker bridge.

pub mod app;
pub mod bridge;

pub mod widgets {
    pub mod player_bar;
    pub mod timestamp_list;
}

pub use app::{AppState, Message, Notice, NoticeLevel, WidgetSignal};
pub use bridge::{BridgeError, EngineBridge, spawn_engine_bridge};
