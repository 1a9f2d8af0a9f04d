pub mod notch;
