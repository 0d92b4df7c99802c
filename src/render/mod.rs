pub mod layout;
pub mod plot_interaction;
