//! Exploratory analysis of video-game sales
//!
//! This crate loads the per-platform sales dataset, cleans it, and answers
//! questions about it: which platforms and genres sell, how sales split across
//! regions, and whether user ratings differ between two groups of games.
//!
//! # Overview
//!
//! Data flows through four stages, each producing a new value from the last:
//!
//! 1. **Load** ([`loader`]): read the CSV into [`loader::RawRecord`]s, all text
//! 2. **Normalize** ([`normalize`]): coerce types, map placeholders to missing,
//!    derive the total, drop duplicate rows ([`table::GameTable`])
//! 3. **Filter** ([`filter`]): drop sales outliers, restrict to the stable year
//!    window, summarize the snapshot year
//! 4. **Analyze** ([`aggregate`], [`hypothesis`]): aggregates, rankings,
//!    correlations and Welch t-tests over [`segment::Segment`]s
//!
//! [`report::AnalysisReport`] runs the whole pipeline with an
//! [`config::AnalysisConfig`].
//!
//! # Missing Values
//!
//! Missing scores, years and ratings are `Option::None` throughout. Aggregates
//! skip them; hypothesis samples additionally drop non-positive scores.
//!
//! # Examples
//!
//! ```
//! use vgsales_analysis::{
//!     aggregate,
//!     record::{Column, Dimension},
//!     segment::Predicate,
//!     table::GameTable,
//! };
//!
//! let csv = "\
//! Name,Platform,Year_of_Release,Genre,NA_sales,EU_sales,JP_sales,Other_sales,Critic_Score,User_Score,Rating
//! Wii Sports,Wii,2006,Sports,41.36,28.96,3.77,8.45,76,8,E
//! Mario Kart Wii,Wii,2008,Racing,15.68,12.76,3.79,3.29,82,8.3,E
//! Halo 3,X360,2007,Shooter,7.97,2.81,0.13,1.21,94,7.8,M
//! Spore,PC,2008,Strategy,0.1,0.2,0,0.05,84,tbd,E10+
//! ";
//! let table = GameTable::from_reader(csv.as_bytes()).unwrap();
//! assert_eq!(table.len(), 4);
//!
//! let wii = table.matching(&Predicate::platform("Wii"));
//! let stats = aggregate::summary(&wii, Column::UserScore).unwrap();
//! assert_eq!(stats.count, 2);
//!
//! let top = aggregate::top_n(&table.segment(), Dimension::Platform, Column::TotalSales, 1);
//! assert_eq!(top[0].key, "Wii");
//! ```

pub mod aggregate;
pub mod config;
pub mod filter;
pub mod hypothesis;
pub mod loader;
pub mod normalize;
pub mod record;
pub mod report;
pub mod segment;
pub mod table;
