pub mod crosslinks;
