pub mod chart_panel;
