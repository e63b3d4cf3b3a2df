use std::fmt;

/// Location of a record inside the tree being compiled, from the root down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordPath {
    segments: Vec<RecordPathSegment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordPathSegment {
    pub name: String,
    pub index: Option<usize>,
}

impl RecordPath {
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            segments: vec![RecordPathSegment {
                name: name.into(),
                index: None,
            }],
        }
    }

    pub fn child(&self, name: impl Into<String>) -> Self {
        self.push(name.into(), None)
    }

    pub fn element(&self, name: impl Into<String>, index: usize) -> Self {
        self.push(name.into(), Some(index))
    }

    fn push(&self, name: String, index: Option<usize>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(RecordPathSegment { name, index });
        Self { segments }
    }

    pub fn segments(&self) -> &[RecordPathSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for RecordPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "/{}", segment.name)?;
            if let Some(index) = segment.index {
                write!(f, "[{index}]")?;
            }
        }
        Ok(())
    }
}
