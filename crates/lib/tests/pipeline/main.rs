mod common;
mod gameobject_tests;
mod project_tests;
mod texture_tests;
