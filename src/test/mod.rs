mod common;
mod ecs_tests;
mod layout_tests;
mod system_tests;
mod text_tests;
mod widget_tests;
