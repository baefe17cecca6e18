pub mod popup_view;
