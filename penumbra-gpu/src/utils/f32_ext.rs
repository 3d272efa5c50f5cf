pub trait F32Ext
where
    Self: Sized,
{
    fn sqr(self) -> Self;
}

impl F32Ext for f32 {
    fn sqr(self) -> Self {
        self * self
    }
}
