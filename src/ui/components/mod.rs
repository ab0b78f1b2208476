pub mod menu;
pub mod progress_bar;
pub mod question_view;
pub mod result_popup;
pub mod summary;
pub mod vocabulary_list;
