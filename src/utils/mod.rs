/// Post-construction consistency check of a level or scene.
pub trait Verify {
    fn verify(&self) -> eyre::Result<()>;

    fn verified(self) -> eyre::Result<Self>
    where
        Self: Sized,
    {
        self.verify()?;
        Ok(self)
    }
}
