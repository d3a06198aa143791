use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use serde::{de::DeserializeOwned, Serialize};

/// A self-contained resource that can be stored in and restored from the
/// binary format written by the `compile` binary.
pub trait Component: Serialize + DeserializeOwned {
    fn name() -> &'static str;

    fn restore<P: AsRef<Path>>(p: P) -> Result<Self, crate::Error> {
        let reader = BufReader::new(File::open(p.as_ref())?);
        Self::from_reader(reader)
    }

    fn from_reader<R: Read>(reader: R) -> Result<Self, crate::Error> {
        Ok(bincode::deserialize_from(reader)?)
    }

    fn store<P: AsRef<Path>>(&self, p: P) -> Result<(), crate::Error> {
        let writer = BufWriter::new(File::create(p.as_ref())?);
        self.to_writer(writer)
    }

    fn to_writer<W: Write>(&self, writer: W) -> Result<(), crate::Error> {
        Ok(bincode::serialize_into(writer, self)?)
    }
}
