use std::{path::Path, sync::Arc};

use rocksdb::{Direction, Options, WriteBatch, DB};
use tracing::debug;

use super::RoundStore;
use crate::kvtable::*;
use crate::{Round, RoundNumber};

pub struct RoundByIndexKV;

// round index => round
impl KVTable<DBInt, DBSerde<Round>> for RoundByIndexKV {
    const CF_NAME: &'static str = "RoundByIndexKV";
}

fn into_round(entry: Option<(DBInt, DBSerde<Round>)>) -> Option<Round> {
    entry.map(|(_, round)| round.0)
}

#[derive(Clone)]
pub struct RocksRoundStore {
    db: Arc<DB>,
}

impl RocksRoundStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let db = DB::open_cf(&opts, path, [RoundByIndexKV::CF_NAME])?;

        Ok(Self { db: Arc::new(db) })
    }

    pub fn destroy(path: impl AsRef<Path>) -> Result<(), Error> {
        DB::destroy(&Options::default(), path)?;
        Ok(())
    }

    /// drop every stored round
    pub fn reset(&self) -> Result<(), Error> {
        RoundByIndexKV::reset(&self.db)
    }

    fn put(&self, round: &Round) -> Result<(), Error> {
        let mut batch = WriteBatch::default();

        RoundByIndexKV::stage_upsert(
            &self.db,
            DBInt(round.index()),
            DBSerde(round.clone()),
            &mut batch,
        )?;

        self.db.write(batch)?;
        Ok(())
    }
}

impl RoundStore for RocksRoundStore {
    fn load(&self, index: RoundNumber) -> Result<Option<Round>, Error> {
        let value = RoundByIndexKV::get_by_key(&self.db, DBInt(index))?;
        Ok(value.map(|x| x.0))
    }

    fn save(&self, round: &Round) -> Result<(), Error> {
        debug!(index = round.index(), hashes = round.len(), "saving round");
        self.put(round)
    }

    fn update_hashes(&self, round: &Round) -> Result<(), Error> {
        // the hash set is the only mutable field, rewriting the value covers it
        self.put(round)
    }

    fn delete(&self, index: RoundNumber) -> Result<(), Error> {
        let mut batch = WriteBatch::default();
        RoundByIndexKV::stage_delete(&self.db, DBInt(index), &mut batch)?;

        self.db.write(batch)?;
        Ok(())
    }

    fn first(&self) -> Result<Option<Round>, Error> {
        RoundByIndexKV::first_entry(&self.db).map(into_round)
    }

    fn latest(&self) -> Result<Option<Round>, Error> {
        RoundByIndexKV::last_entry(&self.db).map(into_round)
    }

    fn previous(&self, index: RoundNumber) -> Result<Option<Round>, Error> {
        RoundByIndexKV::entry_beside(&self.db, DBInt(index), Direction::Reverse).map(into_round)
    }

    fn next(&self, index: RoundNumber) -> Result<Option<Round>, Error> {
        RoundByIndexKV::entry_beside(&self.db, DBInt(index), Direction::Forward).map(into_round)
    }
}
