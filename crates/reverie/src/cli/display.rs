//! Display formatting utilities for CLI output

use colored::*;

use crate::analysis::{AnalysisResult, TopicReport};
use crate::category::Category;

const REPORT_WIDTH: usize = 80;

/// Wrap text to fit within a specified width, keeping blank lines between paragraphs
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
  let mut lines = Vec::new();

  for paragraph in text.split('\n') {
    if paragraph.trim().is_empty() {
      lines.push(String::new());
      continue;
    }

    let mut current_line = String::new();
    for word in paragraph.split_whitespace() {
      if current_line.is_empty() {
        current_line = word.to_string();
      } else if current_line.chars().count() + 1 + word.chars().count() <= width {
        current_line.push(' ');
        current_line.push_str(word);
      } else {
        lines.push(std::mem::take(&mut current_line));
        current_line = word.to_string();
      }
    }

    if !current_line.is_empty() {
      lines.push(current_line);
    }
  }

  lines
}

pub fn report_header(report: &TopicReport) -> String {
  format!("=== {} [{}] ===", report.topic.blue().bold(), report.category.as_str().yellow())
}

fn display_report(report: &TopicReport) {
  println!("{}", report_header(report));

  let sources = match report.context_entries {
    0 => "no matching entries".to_string(),
    1 => "1 matching entry".to_string(),
    n => format!("{n} matching entries"),
  };
  println!("{}", sources.dimmed());
  println!();

  for line in wrap_text(report.text.trim(), REPORT_WIDTH) {
    println!("{line}");
  }
  println!();
}

pub fn display_reports(result: &AnalysisResult) {
  for report in result {
    display_report(report);
  }
}

pub fn display_topics(topics: &[String]) {
  for topic in topics {
    let category = Category::classify(topic);
    println!("{} {} {}", "•".cyan(), topic.bold(), format!("({category})").dimmed());
  }
}
