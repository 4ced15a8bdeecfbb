pub mod tuning_report;
