mod collision;
mod determinism;
mod transmission;
