pub mod drag_board;
pub mod quiz_session;
