mod common;
mod edits;
mod routing;
