mod wraparound;
