//! vaultrun - resolve Vault secret references in the environment, then run a program.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── run           # Resolve and launch
//! │   ├── plan          # Dry run of the scan
//! │   └── completions   # Shell completions
//! └── core/             # Core library components
//!     ├── reference     # $v:/$v!: reference parsing
//!     ├── group         # References grouped by store path
//!     ├── plan          # Scan + resolve pipeline
//!     ├── fetch         # One read per path
//!     ├── compose       # Child environment
//!     ├── launch/       # exec or spawn-and-wait
//!     ├── store/        # SecretStore trait, Vault client, Kubernetes login
//!     └── config        # Settings from the environment
//! ```
//!
//! # Example
//!
//! ```
//! use vaultrun::core::plan::Plan;
//! use vaultrun::core::store::MemoryStore;
//!
//! let store = MemoryStore::new().with_secret("secret/db", &[("password", "p@ss")]);
//! let plan = Plan::scan(vec![("DB_PASSWORD", "$v:db#password")], None);
//! let env = plan.resolve(|| Ok(&store)).unwrap();
//! assert_eq!(env.to_lines(), vec!["DB_PASSWORD=p@ss"]);
//! ```

pub mod cli;
pub mod core;
pub mod error;
