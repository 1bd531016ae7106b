//! sheetcalc_engine - Address codec + arithmetic formula evaluation.

pub mod engine;
