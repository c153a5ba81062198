use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    IO(#[from] rocksdb::Error),

    #[error("serde error: {0}")]
    Serde(#[from] bincode::Error),

    #[error("corrupt entry: {0}")]
    Corrupt(String),

    #[error("missing column family {0}")]
    MissingColumnFamily(&'static str),

    #[error("store lock poisoned")]
    Poisoned,
}

/// Conversion between typed values and raw RocksDB slices.
///
/// Decoding is fallible, corrupt entries surface as errors instead of
/// bringing the process down.
pub trait DBCodec: Sized {
    fn encode(&self) -> Result<Box<[u8]>, Error>;
    fn decode(raw: Box<[u8]>) -> Result<Self, Error>;
}

/// big endian integer key, so the byte order matches the numeric order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DBInt(pub u64);

impl DBCodec for DBInt {
    fn encode(&self) -> Result<Box<[u8]>, Error> {
        Ok(Box::new(self.0.to_be_bytes()))
    }

    fn decode(raw: Box<[u8]>) -> Result<Self, Error> {
        let inner: [u8; 8] = raw
            .as_ref()
            .try_into()
            .map_err(|_| Error::Corrupt(format!("integer key of {} bytes", raw.len())))?;

        Ok(Self(u64::from_be_bytes(inner)))
    }
}

impl From<u64> for DBInt {
    fn from(value: u64) -> Self {
        DBInt(value)
    }
}

impl From<DBInt> for u64 {
    fn from(value: DBInt) -> Self {
        value.0
    }
}

#[derive(Debug)]
pub struct DBSerde<V>(pub V);

impl<V> std::ops::Deref for DBSerde<V> {
    type Target = V;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<V> DBCodec for DBSerde<V>
where
    V: Serialize + DeserializeOwned,
{
    fn encode(&self) -> Result<Box<[u8]>, Error> {
        let raw = bincode::serialize(&self.0)?;
        Ok(raw.into_boxed_slice())
    }

    fn decode(raw: Box<[u8]>) -> Result<Self, Error> {
        let inner = bincode::deserialize(&raw)?;
        Ok(DBSerde(inner))
    }
}

impl<V> Clone for DBSerde<V>
where
    V: Clone,
{
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

type RocksIterator<'a> = rocksdb::DBIteratorWithThreadMode<'a, rocksdb::DB>;

pub struct EntryIterator<'a, K, V>(RocksIterator<'a>, PhantomData<(K, V)>);

impl<'a, K, V> EntryIterator<'a, K, V> {
    pub fn new(inner: RocksIterator<'a>) -> Self {
        Self(inner, Default::default())
    }
}

impl<K, V> Iterator for EntryIterator<'_, K, V>
where
    K: DBCodec,
    V: DBCodec,
{
    type Item = Result<(K, V), Error>;

    fn next(&mut self) -> Option<Result<(K, V), Error>> {
        match self.0.next() {
            Some(Ok((key, value))) => {
                let entry = K::decode(key).and_then(|k| Ok((k, V::decode(value)?)));

                if let Err(err) = &entry {
                    tracing::error!(?err, "undecodable entry");
                }

                Some(entry)
            }
            Some(Err(err)) => {
                tracing::error!(?err);
                Some(Err(Error::IO(err)))
            }
            None => None,
        }
    }
}

pub trait KVTable<K, V>
where
    K: DBCodec,
    V: DBCodec,
{
    const CF_NAME: &'static str;

    fn cf(db: &rocksdb::DB) -> Result<rocksdb::ColumnFamilyRef, Error> {
        db.cf_handle(Self::CF_NAME)
            .ok_or(Error::MissingColumnFamily(Self::CF_NAME))
    }

    fn reset(db: &rocksdb::DB) -> Result<(), Error> {
        db.drop_cf(Self::CF_NAME)?;
        db.create_cf(Self::CF_NAME, &rocksdb::Options::default())?;

        Ok(())
    }

    fn get_by_key(db: &rocksdb::DB, k: K) -> Result<Option<V>, Error> {
        let cf = Self::cf(db)?;
        let raw_key = k.encode()?;

        match db.get_cf(&cf, raw_key)? {
            Some(raw) => Ok(Some(V::decode(raw.into_boxed_slice())?)),
            None => Ok(None),
        }
    }

    fn stage_upsert(
        db: &rocksdb::DB,
        k: K,
        v: V,
        batch: &mut rocksdb::WriteBatch,
    ) -> Result<(), Error> {
        let cf = Self::cf(db)?;
        batch.put_cf(&cf, k.encode()?, v.encode()?);

        Ok(())
    }

    fn stage_delete(db: &rocksdb::DB, k: K, batch: &mut rocksdb::WriteBatch) -> Result<(), Error> {
        let cf = Self::cf(db)?;
        batch.delete_cf(&cf, k.encode()?);

        Ok(())
    }

    fn iter_entries<'a>(
        db: &'a rocksdb::DB,
        mode: rocksdb::IteratorMode,
    ) -> Result<EntryIterator<'a, K, V>, Error> {
        let cf = Self::cf(db)?;
        let inner = db.iterator_cf(&cf, mode);
        Ok(EntryIterator::new(inner))
    }

    fn first_entry(db: &rocksdb::DB) -> Result<Option<(K, V)>, Error> {
        Self::iter_entries(db, rocksdb::IteratorMode::Start)?
            .next()
            .transpose()
    }

    fn last_entry(db: &rocksdb::DB) -> Result<Option<(K, V)>, Error> {
        Self::iter_entries(db, rocksdb::IteratorMode::End)?
            .next()
            .transpose()
    }

    /// first entry found walking from `from` in `direction`, `from` excluded
    fn entry_beside(
        db: &rocksdb::DB,
        from: K,
        direction: rocksdb::Direction,
    ) -> Result<Option<(K, V)>, Error> {
        let from_raw = from.encode()?;
        let mode = rocksdb::IteratorMode::From(&from_raw, direction);

        for entry in Self::iter_entries(db, mode)? {
            let (k, v) = entry?;

            if k.encode()? != from_raw {
                return Ok(Some((k, v)));
            }
        }

        Ok(None)
    }
}
