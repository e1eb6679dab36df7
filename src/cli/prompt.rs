// src/cli/prompt.rs — Show the assembled prompt

use crate::prompt::{current_time_of_day, PromptTemplate};

pub fn show_prompt(template: &PromptTemplate) {
    eprintln!("template: {}", template.source);
    println!("{}", template.build(&current_time_of_day()));
}
