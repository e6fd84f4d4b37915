pub mod report_display;
