pub(crate) mod sharded;
